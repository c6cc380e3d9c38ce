use std::sync::Arc;

use super::{ByteQuadsCanonicalizer, MAX_ENTRIES_FOR_REUSE, SymbolFlags, pack_quads};

fn add(table: &mut ByteQuadsCanonicalizer, name: &str) -> Arc<str> {
    table.add_name(name, &pack_quads(name.as_bytes())).unwrap()
}

fn find(table: &ByteQuadsCanonicalizer, name: &str) -> Option<Arc<str>> {
    table.find_name(&pack_quads(name.as_bytes()), name.len())
}

#[test]
fn added_names_are_returned_identically() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(1);
    let mut table = root.make_child(SymbolFlags::default());
    let a = add(&mut table, "id");
    let b = add(&mut table, "id");
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &find(&table, "id").unwrap()));
    assert_eq!(table.size(), 1);
}

#[test]
fn quad_arity_overloads_agree() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(2);
    let mut table = root.make_child(SymbolFlags::default());
    let one = add(&mut table, "abc");
    let two = add(&mut table, "abcdefg");
    let three = add(&mut table, "abcdefghijkl");
    let q = pack_quads(b"abcdefghijkl");
    assert!(Arc::ptr_eq(&one, &table.find_name_1(q[0] & 0xFFFF_FF00, 3).unwrap()));
    assert!(Arc::ptr_eq(&two, &table.find_name_2(q[0], q[1] & 0xFFFF_FF00, 7).unwrap()));
    assert!(Arc::ptr_eq(&three, &table.find_name_3(q[0], q[1], q[2], 12).unwrap()));
}

#[test]
fn trailing_nul_is_a_different_name() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(3);
    let mut table = root.make_child(SymbolFlags::default());
    let a = add(&mut table, "a");
    let a_nul = add(&mut table, "a\0");
    assert_eq!(&*a, "a");
    assert_eq!(&*a_nul, "a\0");
    assert_eq!(table.size(), 2);
}

#[test]
fn long_names_canonicalize_like_short_ones() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(4);
    let mut table = root.make_child(SymbolFlags::default());
    let long = "a_rather_long_property_name_spanning_many_quads";
    let first = add(&mut table, long);
    let again = add(&mut table, long);
    assert!(Arc::ptr_eq(&first, &again));
    assert!(table.long_quad_count() >= long.len() / 4);
    // Same prefix, different length.
    assert!(find(&table, &long[..long.len() - 1]).is_none());
    assert!(find(&table, "a_rather_long_property_name_spanning_many_quadz").is_none());
}

#[test]
fn empty_name_bypasses_the_table() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(5);
    let mut table = root.make_child(SymbolFlags::default());
    let empty = table.add_name("", &[]).unwrap();
    assert_eq!(&*empty, "");
    assert_eq!(table.size(), 0);
    assert!(table.find_name(&[], 0).is_some());
}

#[test]
fn rehash_preserves_every_entry() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(6);
    let mut table = root.make_child(SymbolFlags::default());
    let names: Vec<String> = (0..2000).map(|i| format!("field{i}")).collect();
    let added: Vec<Arc<str>> = names.iter().map(|n| add(&mut table, n)).collect();
    assert_eq!(table.size(), names.len());
    assert_eq!(table.total_count(), names.len());
    assert!(table.capacity().is_power_of_two());
    assert!(table.capacity() > 2000);
    for (name, arc) in names.iter().zip(&added) {
        assert!(Arc::ptr_eq(arc, &find(&table, name).unwrap()), "{name}");
    }
}

#[test]
fn forty_repeated_names_leave_forty_root_entries() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(7);
    let mut table = root.make_child(SymbolFlags::default());
    for _ in 0..500 {
        for i in 0..40 {
            add(&mut table, &format!("name_{i}"));
        }
    }
    table.release();
    assert_eq!(root.size(), 40);

    // A later child sees the merged names without copying.
    let child = root.make_child(SymbolFlags::default());
    assert!(find(&child, "name_39").is_some());
    assert!(child.is_shared());
}

#[test]
fn first_merge_wins() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(8);
    let mut a = root.make_child(SymbolFlags::default());
    let mut b = root.make_child(SymbolFlags::default());
    add(&mut a, "x");
    add(&mut b, "y");
    add(&mut b, "z");
    a.release();
    assert_eq!(root.size(), 1);
    // `b` was built from the snapshot `a` replaced.
    b.release();
    assert_eq!(root.size(), 1);
}

#[test]
fn release_is_idempotent_and_runs_on_drop() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(9);
    {
        let mut child = root.make_child(SymbolFlags::default());
        add(&mut child, "dropped");
    }
    assert_eq!(root.size(), 1);
    let mut child = root.make_child(SymbolFlags::default());
    add(&mut child, "second");
    child.release();
    child.release();
    assert_eq!(root.size(), 2);
}

#[test]
fn oversized_children_reset_the_root() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(10);
    let mut child = root.make_child(SymbolFlags::default());
    for i in 0..=MAX_ENTRIES_FOR_REUSE {
        add(&mut child, &format!("n{i}"));
    }
    child.release();
    assert_eq!(root.size(), 0);
}

#[test]
fn non_canonicalizing_children_store_nothing() {
    let root = ByteQuadsCanonicalizer::create_root_with_seed(11);
    let mut child = root.make_child(SymbolFlags {
        canonicalize: false,
        ..SymbolFlags::default()
    });
    let a = add(&mut child, "k");
    let b = add(&mut child, "k");
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(child.size(), 0);
    assert!(!child.is_canonicalizing());
    child.release();
    assert_eq!(root.size(), 0);
}

#[test]
fn interning_shares_across_roots() {
    let flags = SymbolFlags {
        intern: true,
        ..SymbolFlags::default()
    };
    let mut a = ByteQuadsCanonicalizer::create_root_with_seed(12).make_child(flags);
    let mut b = ByteQuadsCanonicalizer::create_root_with_seed(13).make_child(flags);
    let x = add(&mut a, "interned_name");
    let y = add(&mut b, "interned_name");
    assert!(Arc::ptr_eq(&x, &y));
}

#[test]
fn seeds_change_layout_not_contents() {
    let names = ["alpha", "beta", "gamma", "delta", "a_long_name_over_twelve"];
    for seed in [0, 1, 0xDEAD_BEEF] {
        let mut table = ByteQuadsCanonicalizer::standalone(seed, SymbolFlags::default());
        for n in names {
            add(&mut table, n);
        }
        for n in names {
            assert_eq!(find(&table, n).as_deref(), Some(n));
        }
        assert_eq!(table.hash_seed(), seed);
    }
}
