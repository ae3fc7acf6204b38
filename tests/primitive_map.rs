// Primitive map behavior suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Sentinel: absent keys read as the default return value; the compute
//   family removes a key whose new value is the default return value.
// - Bounds: bulk ingestion checks its ranges before touching the map.
// - Equality: equal entry sets give equal maps and hash codes, whatever the
//   insertion order or representation.
// - Views: views borrow the map; removal through a view removes from it.
// - Fail-fast: a cursor reports structural changes it did not make.
use primitive_hashmap::{
    HandleHashMap, MapConfig, MapError, OpenHashMap, PrimitiveMap, PrimitiveMapMut, Unmodifiable,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashSet};
use std::hash::{Hash, Hasher};

fn std_hash<T: Hash>(t: &T) -> u64 {
    let mut h = DefaultHasher::new();
    t.hash(&mut h);
    h.finish()
}

// Test: the basic put/get/remove scenario.
// Assumes: char values default to '\0'.
// Verifies: removal leaves only the other entry, rendered as `{2=b}`.
#[test]
fn put_get_remove_renders_remaining_entry() {
    let mut m: OpenHashMap<i32, char> = OpenHashMap::new();
    assert_eq!(m.put(1, 'a'), '\0');
    assert_eq!(m.put(2, 'b'), '\0');
    assert_eq!(m.get(1), 'a');
    assert_eq!(m.remove(1), 'a');
    assert_eq!(m.get(1), *m.default_return_value());
    assert_eq!(m.len(), 1);
    assert_eq!(m.to_string(), "{2=b}");
}

// Test: rendering of empty and single-entry maps.
#[test]
fn display_format() {
    let mut m: OpenHashMap<u8, bool> = OpenHashMap::new();
    assert_eq!(m.to_string(), "{}");
    m.put(7, true);
    assert_eq!(m.to_string(), "{7=true}");

    let mut f: OpenHashMap<f64, Option<String>> = OpenHashMap::new();
    f.put(1.5, None);
    assert_eq!(f.to_string(), "{1.5=null}");
    f.put(1.5, Some("x".to_string()));
    assert_eq!(f.to_string(), "{1.5=x}");
}

// Test: float keys and values render like Java's Float/Double toString.
// Verifies: f32 is not widened before printing; magnitudes outside
// [1e-3, 1e7) use the `1.0E7` form.
#[test]
fn display_float_notation() {
    let mut narrow: OpenHashMap<f32, f32> = OpenHashMap::new();
    narrow.put(0.1, 0.3);
    assert_eq!(narrow.to_string(), "{0.1=0.3}");

    let mut wide: OpenHashMap<f64, f64> = OpenHashMap::new();
    wide.put(1e7, 1e-4);
    assert_eq!(wide.to_string(), "{1.0E7=1.0E-4}");

    let mut handles: HandleHashMap<f64, f32> = HandleHashMap::new();
    handles.put(-2.5e-9, 123456.7);
    assert_eq!(handles.to_string(), "{-2.5E-9=123456.7}");
}

// Test: bulk ingestion from parallel arrays honors offset and size.
// Verifies: only keys[1..3] are inserted.
#[test]
fn put_all_from_slices_with_offset() {
    let mut m: OpenHashMap<i32, i32> = OpenHashMap::new();
    m.put_all_from_slices(&[1, 2, 3], &[10, 20, 30], 1, 2).unwrap();
    assert_eq!(m.len(), 2);
    assert!(!m.contains_key(1));
    assert_eq!(m.get(2), 20);
    assert_eq!(m.get(3), 30);
}

// Test: out-of-range bulk ingestion.
// Assumes: checks run before insertion.
// Verifies: the error names the range and the map is unchanged, including
// when only the value slice is too short.
#[test]
fn put_all_from_slices_bounds_leave_map_unchanged() {
    let mut m: OpenHashMap<i32, i32> = OpenHashMap::new();
    m.put(9, 9);
    let before = m.clone();

    let err = m.put_all_from_slices(&[1, 2, 3], &[10, 20, 30], 2, 2).unwrap_err();
    assert_eq!(err, MapError::IndexOutOfBounds { offset: 2, size: 2, len: 3 });
    assert_eq!(m, before);

    let err = m.put_all_from_slices(&[1, 2, 3], &[10], 0, 3).unwrap_err();
    assert!(matches!(err, MapError::IndexOutOfBounds { len: 1, .. }));
    assert_eq!(m, before);

    let mut h: HandleHashMap<i32, i32> = HandleHashMap::new();
    assert!(h.put_all_from_slices(&[1], &[1], usize::MAX, 2).is_err());
    assert!(h.is_empty());
}

// Test: compute family removal law.
// Verifies: a mapping result equal to the default return value leaves the
// key absent, exactly like `remove`.
#[test]
fn compute_and_merge_remove_on_sentinel() {
    let mut m: OpenHashMap<i64, i32> = OpenHashMap::new();
    m.set_default_return_value(-1);
    m.put(1, 5);
    m.put(2, 6);
    m.put(3, 7);

    assert_eq!(m.compute(1, |_, _| -1), -1);
    assert!(!m.contains_key(1));

    assert_eq!(m.compute_if_present(2, |_, _| -1), -1);
    assert!(!m.contains_key(2));

    assert_eq!(m.merge(3, 0, |_, _| -1), -1);
    assert!(!m.contains_key(3));

    // Absent key: nothing is stored.
    assert_eq!(m.merge(4, -1, |a, b| a + b), -1);
    assert_eq!(m.compute_if_absent(5, |_| -1), -1);
    assert!(!m.contains_key(4));
    assert!(!m.contains_key(5));
    assert!(m.is_empty());
}

// Test: compute family on the ordinary path.
#[test]
fn compute_family_updates() {
    let mut m: OpenHashMap<char, i32> = OpenHashMap::new();
    assert_eq!(m.compute('a', |_, v| v + 1), 1);
    assert_eq!(m.compute('a', |_, v| v + 1), 2);
    assert_eq!(m.compute_if_absent('a', |_| 100), 2);
    assert_eq!(m.compute_if_absent('b', |k| k as i32), 98);
    assert_eq!(m.compute_if_present('c', |_, v| v * 2), 0);
    assert!(!m.contains_key('c'));
    assert_eq!(m.merge('b', 2, |a, b| a * b), 196);
    assert_eq!(m.merge('z', 3, |a, b| a * b), 3);
    assert_eq!(m.compute_with('z', |_, v| v.map(|x| x * 10)), Some(30));
    assert_eq!(m.compute_with('z', |_, _| None), None);
    assert!(!m.contains_key('z'));
}

// Test: conditional replace and remove.
#[test]
fn conditional_operations() {
    let mut m: OpenHashMap<u32, String> = OpenHashMap::new();
    m.set_default_return_value("none".to_string());
    assert_eq!(m.put_if_absent(1, "a".to_string()), "none");
    assert_eq!(m.put_if_absent(1, "b".to_string()), "a");
    assert_eq!(m.replace(2, "x".to_string()), "none");
    assert!(!m.contains_key(2));
    assert_eq!(m.replace(1, "c".to_string()), "a");
    assert!(!m.replace_if_equal(1, &"zzz".to_string(), "d".to_string()));
    assert!(m.replace_if_equal(1, &"c".to_string(), "d".to_string()));
    assert!(!m.remove_if_equal(1, &"c".to_string()));
    assert!(m.remove_if_equal(1, &"d".to_string()));
    assert!(m.is_empty());
    assert_eq!(m.get_or_default(1, "fallback".to_string()), "fallback");
}

// Test: `put` stores the default return value like any other value.
// Verifies: contains_key tells a stored default apart from absence.
#[test]
fn stored_default_is_present() {
    let mut m: OpenHashMap<i16, i16> = OpenHashMap::new();
    m.put(3, 0);
    assert_eq!(m.get(3), 0);
    assert!(m.contains_key(3));
    assert_eq!(m.lookup(3), Some(&0));
    assert_eq!(m.lookup(4), None);
}

// Test: for_each, replace_all and put_all.
#[test]
fn bulk_traversals() {
    let mut m: OpenHashMap<i32, i32> = (1..=5).map(|k| (k, k)).collect();
    m.replace_all(|k, v| k * 100 + v);
    let mut sum = 0;
    m.for_each(|_, v| sum += *v);
    assert_eq!(sum, (1..=5).map(|k| k * 101).sum::<i32>());

    let mut h: HandleHashMap<i32, i32> = HandleHashMap::new();
    h.put_all(&m);
    assert_eq!(h, m);
    assert!(m.contains_value(&303));
    assert!(!m.contains_value(&3));
}

// Test: equality and hash code are independent of insertion order and
// representation.
#[test]
fn equality_and_hash_across_orders_and_representations() {
    let entries = [(3i32, 30i64), (1, 10), (-7, 70), (0, 5), (1 << 20, 1)];
    let a: OpenHashMap<i32, i64> = entries.iter().copied().collect();
    let b: OpenHashMap<i32, i64> = entries.iter().rev().copied().collect();
    let c: HandleHashMap<i32, i64> = entries.iter().copied().collect();

    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(c, a);
    assert_eq!(a.hash_code(), b.hash_code());
    assert_eq!(a.hash_code(), c.hash_code());
    assert_eq!(std_hash(&a), std_hash(&c));

    let expected: i32 = entries
        .iter()
        .map(|(k, v)| k ^ ((v ^ (v >> 32)) as i32))
        .fold(0i32, |acc, h| acc.wrapping_add(h));
    assert_eq!(a.hash_code(), expected);

    let mut d = a.clone();
    d.put(3, 31);
    assert_ne!(a, d);
    d.put(3, 30);
    d.put(4, 40);
    assert_ne!(a, d);
}

// Test: float keys keep bitwise identity through equality.
#[test]
fn float_key_equality_is_bitwise() {
    let mut a: OpenHashMap<f32, i32> = OpenHashMap::new();
    let mut b: OpenHashMap<f32, i32> = OpenHashMap::new();
    a.put(0.0, 1);
    b.put(-0.0, 1);
    assert_ne!(a, b);
    a.put(f32::NAN, 2);
    assert_eq!(a.get(f32::NAN), 2);
}

// Test: views reflect and mutate the backing map.
// Verifies: keySet removal removes from the map; sizes agree.
#[test]
fn views_are_coupled_to_the_map() {
    let mut m: OpenHashMap<i32, i32> = (0..10).map(|k| (k, k * k)).collect();
    assert_eq!(m.entry_set().len(), m.len());
    assert_eq!(m.key_set().len(), m.len());
    assert!(m.key_set().contains(3));
    assert!(m.values().contains(&81));
    assert!(m.entry_set().contains(2, &4));
    assert!(!m.entry_set().contains(2, &5));

    assert!(m.key_set_mut().remove(3));
    assert!(!m.contains_key(3));
    assert!(!m.key_set_mut().remove(3));

    assert!(m.values_mut().remove(&16));
    assert!(!m.contains_key(4));

    assert!(!m.entry_set_mut().remove(5, &0));
    assert!(m.entry_set_mut().remove(5, &25));
    assert!(!m.contains_key(5));

    for v in m.values_mut().iter_mut() {
        *v += 1;
    }
    assert_eq!(m.get(2), 5);

    m.key_set_mut().retain(|k| k % 2 == 0);
    let keys: BTreeSet<i32> = m.key_set().iter().collect();
    assert_eq!(keys, [0, 2, 6, 8].into_iter().collect::<BTreeSet<_>>());
    assert_eq!(m.entry_set().len(), 4);

    m.values_mut().clear();
    assert!(m.is_empty());
}

// Test: view rendering.
#[test]
fn view_display() {
    let mut m: OpenHashMap<i32, char> = OpenHashMap::new();
    assert_eq!(m.key_set().to_string(), "[]");
    m.put(1, 'x');
    assert_eq!(m.key_set().to_string(), "[1]");
    assert_eq!(m.values().to_string(), "[x]");
    assert_eq!(m.entry_set().to_string(), "[1=x]");
}

// Test: the fail-fast cursor.
// Verifies: removal through the cursor keeps it valid; an outside insert
// trips it.
#[test]
fn cursor_fail_fast() {
    let mut m: OpenHashMap<i32, i32> = (1..=50).map(|k| (k, k)).collect();
    let mut cur = m.cursor();
    let mut seen = 0;
    while let Some((k, _)) = cur.next(&m).unwrap() {
        seen += 1;
        if k % 2 == 0 {
            cur.remove(&mut m).unwrap();
        }
    }
    assert_eq!(seen, 50);
    assert_eq!(m.len(), 25);

    let mut cur = m.cursor();
    cur.next(&m).unwrap();
    m.put(1000, 1);
    assert_eq!(cur.next(&m), Err(MapError::ConcurrentModification));
}

// Test: explicit load factors and capacity management.
#[test]
fn configured_maps_grow_and_trim() {
    let cfg = MapConfig::new().with_expected(4).with_load_factor(0.5);
    let mut m: OpenHashMap<u64, u64> = OpenHashMap::with_config(cfg).unwrap();
    assert_eq!(m.load_factor(), 0.5);
    for k in 0..10_000u64 {
        m.put(k, k);
    }
    assert!(m.capacity() >= 20_000);
    m.retain(|k, _| k < 10);
    m.trim();
    assert!(m.capacity() <= 32);
    for k in 0..10u64 {
        assert_eq!(m.get(k), k);
    }
    m.ensure_capacity(1000);
    assert!(m.capacity() >= 2000);
    assert_eq!(m.len(), 10);
}

// Test: add_to on counters.
#[test]
fn add_to_counts() {
    let mut m: OpenHashMap<char, u32> = OpenHashMap::new();
    for c in "hello world".chars() {
        m.add_to(c, 1);
    }
    assert_eq!(m.get('l'), 3);
    assert_eq!(m.get('o'), 2);
    assert_eq!(m.get('q'), 0);
}

// Test: the read-only wrapper exposes only the read side.
#[test]
fn unmodifiable_reads() {
    let m: OpenHashMap<i32, i32> = (0..3).map(|k| (k, k)).collect();
    let ro = Unmodifiable::new(m);
    assert_eq!(ro.get(2), 2);
    assert_eq!(ro.entry_set().len(), 3);
    assert!(ro.get_ref().contains_key(0));
}

// Test: read-only maps as set elements.
// Verifies: Eq and Hash forward to the wrapped map, so equal contents
// collapse to one set element.
#[test]
fn unmodifiable_in_hash_set() {
    let a: OpenHashMap<i32, i32> = (0..3).map(|k| (k, k)).collect();
    let b: OpenHashMap<i32, i32> = (0..3).rev().map(|k| (k, k)).collect();
    let c: OpenHashMap<i32, i32> = (0..4).map(|k| (k, k)).collect();
    assert_eq!(std_hash(&Unmodifiable::new(a.clone())), std_hash(&a));

    let mut set = HashSet::new();
    assert!(set.insert(Unmodifiable::new(a)));
    assert!(!set.insert(Unmodifiable::new(b)));
    assert!(set.insert(Unmodifiable::new(c)));
    assert_eq!(set.len(), 2);
}
