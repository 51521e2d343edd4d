use crate::config::BuildConfig;
use crate::error::Error;
use crate::hash::*;
use crate::merkle::{get_merkle_tree_height, get_merkle_tree_len, next_layer_width, MerkleTree};
use crate::proof::{verify, Side};
use crate::test_common::{get_vec_tree_from_slice, item_data, Item, XOR128};
use std::hash::Hasher;

fn leaf(data: &[u8]) -> Item {
    XOR128::new().leaf(data).unwrap()
}

fn node(left: &Item, right: &Item) -> Item {
    XOR128::new().node(left, right).unwrap()
}

#[test]
fn test_hasher_light() {
    let mut h = XOR128::new();
    h.write(b"1234567812345678");
    assert_eq!(format!("{:#X}", h), "0x31323334353637383132333435363738");
    h.write(b"1234567812345678");
    assert_eq!(format!("{:#X}", h), "0x00000000000000000000000000000000");
    h.write(b"1234567812345678");
    assert_eq!(format!("{:#X}", h), "0x31323334353637383132333435363738");
    h.reset();
    assert_eq!(h.hash().unwrap(), [0u8; 16]);
}

#[test]
fn test_empty_tree() {
    let data: Vec<&[u8]> = vec![];
    let t: MerkleTree<Item, XOR128> = MerkleTree::from_data(data).unwrap();

    assert!(t.is_empty());
    assert_eq!(t.root(), None);
    assert_eq!(t.leafs(), 0);
    assert_eq!(t.height(), 0);
    assert_eq!(t.len(), 0);
    assert!(t.layer(0).is_none());

    match t.gen_proof(0) {
        Err(Error::IndexOutOfRange { index, leafs }) => {
            assert_eq!(index, 0);
            assert_eq!(leafs, 0);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_single_leaf() {
    let t: MerkleTree<Item, XOR128> = MerkleTree::from_data(["only"]).unwrap();
    let root = t.root().unwrap();

    assert_eq!(root, leaf(b"only"));
    assert_eq!(t.height(), 1);
    assert_eq!(t.len(), 1);

    let p = t.gen_proof(0).unwrap();
    assert!(p.is_empty());
    assert!(verify::<Item, XOR128>(b"only", 0, &p, &root).unwrap());
    assert!(!verify::<Item, XOR128>(b"other", 0, &p, &root).unwrap());
}

#[test]
fn test_odd_node_is_carried_up() {
    let t: MerkleTree<Item, XOR128> = MerkleTree::from_data(["a", "b", "c"]).unwrap();
    let (a, b, c) = (leaf(b"a"), leaf(b"b"), leaf(b"c"));

    assert_eq!(t.layer(0).unwrap(), &[a, b, c]);
    assert_eq!(t.layer(1).unwrap(), &[node(&a, &b), c]);
    assert_eq!(t.layer(2).unwrap(), &[node(&node(&a, &b), &c)]);
    assert!(t.layer(3).is_none());
    assert_eq!(t.root(), Some(node(&node(&a, &b), &c)));

    // c has no sibling on the leaf layer.
    let p = t.gen_proof(2).unwrap();
    assert_eq!(p.lemma(), &[node(&a, &b)]);
    assert_eq!(p.path(), &[Side::Left]);

    let p = t.gen_proof(0).unwrap();
    assert_eq!(p.lemma(), &[b, c]);
    assert_eq!(p.path(), &[Side::Right, Side::Right]);
}

#[test]
fn test_carried_twice() {
    // 5 -> 3 -> 2 -> 1: leaf 4 is the odd node on the first two layers.
    let t = get_vec_tree_from_slice(5);
    let leafs = t.layer(0).unwrap().to_vec();

    let h01 = node(&leafs[0], &leafs[1]);
    let h23 = node(&leafs[2], &leafs[3]);
    assert_eq!(t.layer(1).unwrap(), &[h01, h23, leafs[4]]);
    assert_eq!(t.layer(2).unwrap(), &[node(&h01, &h23), leafs[4]]);
    assert_eq!(t.root(), Some(node(&node(&h01, &h23), &leafs[4])));

    let p = t.gen_proof(4).unwrap();
    assert_eq!(p.lemma(), &[node(&h01, &h23)]);
    assert_eq!(p.path(), &[Side::Left]);
}

#[test]
fn test_tree_shape() {
    for leafs in 1..130 {
        let t = get_vec_tree_from_slice(leafs);
        assert_eq!(t.leafs(), leafs);
        assert_eq!(t.height(), get_merkle_tree_height(leafs));
        assert_eq!(t.len(), get_merkle_tree_len(leafs));
        assert_eq!(t.layers().last().map(|l| l.len()), Some(1));

        let widths: Vec<usize> = t.layers().map(|l| l.len()).collect();
        for w in widths.windows(2) {
            assert_eq!(w[1], (w[0] + 1) / 2);
        }
    }

    assert_eq!(get_merkle_tree_height(0), 0);
    assert_eq!(get_merkle_tree_height(1), 1);
    assert_eq!(get_merkle_tree_height(2), 2);
    assert_eq!(get_merkle_tree_height(3), 3);
    assert_eq!(get_merkle_tree_height(4), 3);
    assert_eq!(get_merkle_tree_height(5), 4);
    assert_eq!(get_merkle_tree_len(5), 5 + 3 + 2 + 1);
}

#[test]
fn test_leafs_follow_input_order() {
    let t = get_vec_tree_from_slice(17);
    for i in 0..17 {
        assert_eq!(t.leaf(i).unwrap(), leaf(&item_data(i)));
    }
    assert!(matches!(
        t.leaf(17),
        Err(Error::IndexOutOfRange { index: 17, leafs: 17 })
    ));
}

#[test]
fn test_all_proofs_validate() {
    for leafs in 1..34 {
        let t = get_vec_tree_from_slice(leafs);
        let root = t.root().unwrap();

        for i in 0..leafs {
            let p = t.gen_proof(i).unwrap();
            assert_eq!(p.leafs(), leafs);
            assert!(p.len() < t.height());
            assert!(verify::<Item, XOR128>(&item_data(i), i, &p, &root).unwrap());

            // Same proof claimed for another position.
            let other = (i + 1) % leafs;
            if other != i {
                assert!(!verify::<Item, XOR128>(&item_data(i), other, &p, &root).unwrap());
            }
        }

        assert!(matches!(
            t.gen_proof(leafs),
            Err(Error::IndexOutOfRange { .. })
        ));
    }
}

#[test]
fn test_parallel_build_matches_sequential() {
    let data: Vec<Vec<u8>> = (0..1000).map(item_data).collect();

    let seq: MerkleTree<Item, XOR128> =
        MerkleTree::from_data_with_config(&data, BuildConfig::sequential()).unwrap();
    let par: MerkleTree<Item, XOR128> =
        MerkleTree::from_data_with_config(&data, BuildConfig::new(2)).unwrap();

    assert_eq!(seq, par);
    assert_eq!(seq.root(), par.root());
}

#[test]
fn test_from_leafs() {
    let data: Vec<Vec<u8>> = (0..9).map(item_data).collect();
    let leafs: Vec<Item> = data.iter().map(|d| leaf(d)).collect();

    let from_data: MerkleTree<Item, XOR128> = MerkleTree::from_data(&data).unwrap();
    let from_leafs: MerkleTree<Item, XOR128> = MerkleTree::from_leafs(leafs.clone()).unwrap();
    let from_iter: MerkleTree<Item, XOR128> =
        MerkleTree::try_from_iter(leafs.iter().cloned().map(Ok)).unwrap();
    let par: MerkleTree<Item, XOR128> =
        MerkleTree::from_leafs_with_config(leafs, BuildConfig::new(1)).unwrap();

    assert_eq!(from_data, from_leafs);
    assert_eq!(from_data, from_iter);
    assert_eq!(from_data, par);
}

#[test]
fn test_try_from_iter_stops_on_error() {
    let mut a = XOR128::new();
    let result: crate::error::Result<MerkleTree<Item, XOR128>> =
        MerkleTree::try_from_iter((0..8).map(|i| {
            if i == 5 {
                Err(Error::DigestProviderFailure(anyhow::anyhow!("leaf {} unavailable", i)))
            } else {
                a.leaf(&item_data(i))
            }
        }));

    assert!(matches!(result, Err(Error::DigestProviderFailure(_))));
}

#[test]
fn test_tree_is_shared_between_threads() {
    let t = get_vec_tree_from_slice(64);
    let root = t.root().unwrap();

    std::thread::scope(|s| {
        for k in 0..4 {
            let t = &t;
            s.spawn(move || {
                for i in (k..64).step_by(4) {
                    let p = t.gen_proof(i).unwrap();
                    assert!(verify::<Item, XOR128>(&item_data(i), i, &p, &root).unwrap());
                }
            });
        }
    });
}

#[test]
fn test_layer_width_does_not_overflow() {
    assert_eq!(next_layer_width(0), 0);
    assert_eq!(next_layer_width(1), 1);
    assert_eq!(next_layer_width(5), 3);
    assert_eq!(next_layer_width(usize::MAX), usize::MAX / 2 + 1);

    // usize::MAX -> 2^63 -> ... -> 1
    assert_eq!(get_merkle_tree_height(usize::MAX), usize::BITS as usize + 1);
}
