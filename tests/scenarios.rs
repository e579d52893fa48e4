use order_stat_trees::{
    AaTree, AvlTree, Error, FhqTreap, OrderStatistic, RedBlackTree, ScapegoatTree, SplayTree, Treap, scapegoat,
};
use pretty_assertions::assert_eq;

// ─── AVL ─────────────────────────────────────────────────────────────────────

#[test]
fn avl_sequential_inserts_stay_balanced() {
    let mut tree = AvlTree::new();
    for value in 1..=7 {
        tree.insert(value);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), (1..=7).collect::<Vec<_>>());
    // ceil(log2(8)) levels, counted in edges.
    assert!(tree.height() <= 3, "height {} after sequential inserts", tree.height());
    assert_eq!(tree.height(), 2);
}

// ─── Red-black ───────────────────────────────────────────────────────────────

#[test]
fn red_black_delete_after_rotations() {
    let mut tree = RedBlackTree::new();
    for value in [10, 20, 30, 40, 50, 25] {
        tree.insert(value);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    tree.delete(&20);

    assert!(!tree.contains(&20));
    assert_eq!(tree.kth(1), Ok(&10));
    assert_eq!(tree.kth(5), Ok(&50));
    assert_eq!(tree.kth(6), Err(Error::OutOfRange));
    assert_eq!(tree.check_invariants(), Ok(()));
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [10, 25, 30, 40, 50]);
}

// ─── Treaps ──────────────────────────────────────────────────────────────────

fn neighbours_of_four<O: OrderStatistic<i32>>(tree: &mut O) {
    for value in [5, 3, 8, 1, 4] {
        tree.insert(value);
    }
    assert_eq!(tree.rank(&4), 3);
    assert_eq!(tree.predecessor(&4), Ok(&3));
    assert_eq!(tree.successor(&4), Ok(&5));
}

#[test]
fn treap_rank_and_neighbours() {
    for seed in 0..32 {
        let mut tree = Treap::with_seed(seed);
        neighbours_of_four(&mut tree);
        assert_eq!(tree.check_invariants(), Ok(()));
    }
}

#[test]
fn fhq_treap_rank_and_neighbours() {
    for seed in 0..32 {
        let mut tree = FhqTreap::with_seed(seed);
        neighbours_of_four(&mut tree);
        assert_eq!(tree.check_invariants(), Ok(()));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 8]);
    }
}

// ─── Splay ───────────────────────────────────────────────────────────────────

#[test]
fn splay_kth_then_insert_new_minimum() {
    let mut tree = SplayTree::new();
    tree.extend([1, 2, 3]);

    assert_eq!(tree.kth(1), Ok(&1));
    assert_eq!(tree.root(), Some(&1));

    tree.insert(0);
    assert_eq!(tree.check_invariants(), Ok(()));
    assert_eq!(tree.kth(1), Ok(&0));
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [0, 1, 2, 3]);
}

#[test]
fn splay_reads_restructure_the_tree() {
    let mut tree: SplayTree<i32> = (1..=100).collect();
    let before = tree.root().copied();

    assert_eq!(tree.rank(&40), 40);
    assert_eq!(tree.root(), Some(&40));
    assert_ne!(before, Some(40));

    assert_eq!(tree.predecessor(&40), Ok(&39));
    assert_eq!(tree.root(), Some(&39));

    assert_eq!(tree.successor(&70), Ok(&71));
    assert_eq!(tree.root(), Some(&71));

    assert!(tree.contains(&10));
    assert_eq!(tree.root(), Some(&10));

    // Iteration does not touch the shape.
    assert_eq!(tree.iter().count(), 100);
    assert_eq!(tree.root(), Some(&10));
    assert_eq!(tree.check_invariants(), Ok(()));
}

// ─── Scapegoat ───────────────────────────────────────────────────────────────

#[test]
fn scapegoat_deletion_is_lazy() {
    let mut tree = ScapegoatTree::new();
    assert_eq!(tree.alpha(), scapegoat::DEFAULT_ALPHA);
    for value in 1..=15 {
        tree.insert(value);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    tree.delete(&8);

    assert_eq!(tree.len(), 14);
    assert_eq!(tree.node_count(), 15);
    assert!(!tree.contains(&8));
    assert_eq!(tree.kth(8), Ok(&9));
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn scapegoat_reinserting_a_dead_value() {
    let mut tree: ScapegoatTree<i32> = (1..=15).collect();
    tree.delete(&8);
    tree.insert(8);
    assert_eq!(tree.len(), 15);
    assert!(tree.contains(&8));
    assert_eq!(tree.rank(&8), 8);
    assert_eq!(tree.check_invariants(), Ok(()));
}

// ─── AA ──────────────────────────────────────────────────────────────────────

#[test]
fn aa_interleaved_updates() {
    let mut tree = AaTree::new();
    for value in (0..200).map(|i| (i * 37) % 101) {
        tree.insert(value);
    }
    for value in (0..101).step_by(2) {
        tree.delete(&value);
        assert_eq!(tree.check_invariants(), Ok(()));
    }
    // Every residue appears once, the first 99 multiples of 37 twice.
    assert_eq!(tree.len(), 200 - 51);
    assert_eq!(tree.kth(1), Ok(&0));
    assert_eq!(tree.kth(2), Ok(&1));
}
