use dupetrim::actions::DeletionPlanner;
use dupetrim::duplicates::{group_by_size, DuplicateGroup};
use dupetrim::scanner::{FileRecord, Hasher, HEAD_SIZE};
use dupetrim::RunStatistics;
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn records(sizes: &[u64]) -> Vec<FileRecord> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| FileRecord::new(PathBuf::from(format!("/fake/path/{}", i)), size, false, i))
        .collect()
}

proptest! {
    #[test]
    fn test_hash_determinism(content in prop::collection::vec(any::<u8>(), 0..8192)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, &content).unwrap();

        let hasher = Hasher::new();
        let hash1 = hasher.full_hash(&path).unwrap();
        let hash2 = hasher.full_hash(&path).unwrap();

        prop_assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_head_equals_full_within_window(content in prop::collection::vec(any::<u8>(), 0..4096)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, &content).unwrap();

        prop_assert!((content.len() as u64) <= HEAD_SIZE);
        let hasher = Hasher::new();
        let head = hasher.head_hash(&path, content.len() as u64).unwrap();
        let full = hasher.full_hash(&path).unwrap();

        prop_assert_eq!(head, full);
    }

    #[test]
    fn test_group_by_size_invariants(sizes in prop::collection::vec(0u64..20, 0..50)) {
        let mut stats = RunStatistics::default();
        let groups = group_by_size(records(&sizes), &mut stats);

        for group in &groups {
            // Invariant: all files in a group share the size
            for file in &group.files {
                prop_assert_eq!(file.size, group.size);
            }
            // Invariant: no singletons survive
            prop_assert!(group.files.len() >= 2);
            // Invariant: members keep discovery order
            prop_assert!(group.files.windows(2).all(|w| w[0].index < w[1].index));
        }

        // Invariant: buckets ordered by their first member
        prop_assert!(groups.windows(2).all(|w| w[0].files[0].index < w[1].files[0].index));

        // Invariant: every input is either grouped or discarded
        let grouped: usize = groups.iter().map(|g| g.files.len()).sum();
        prop_assert_eq!(grouped as u64 + stats.discarded_unique_size, sizes.len() as u64);

        let mut distinct = sizes.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(stats.distinct_sizes, distinct.len() as u64);
    }

    #[test]
    fn test_planner_never_deletes_references(flags in prop::collection::vec(any::<bool>(), 2..12)) {
        let files = flags
            .iter()
            .enumerate()
            .map(|(i, &is_reference)| {
                FileRecord::new(PathBuf::from(format!("/tree/{}", i)), 7, is_reference, i)
            })
            .collect();
        let group = DuplicateGroup::new([1u8; 32], 7, files);
        let plan = DeletionPlanner::new().plan_group(&group);

        // Invariant: reference files are always retained
        prop_assert!(plan.to_delete.iter().all(|f| !f.is_reference));
        // Invariant: the first discovered copy is always retained
        prop_assert_eq!(plan.retained[0].index, 0);
        // Invariant: the partition covers every member exactly once
        prop_assert_eq!(plan.retained.len() + plan.to_delete.len(), flags.len());

        let references = flags.iter().filter(|&&r| r).count();
        let expected_retained = if flags[0] { references } else { references + 1 };
        prop_assert_eq!(plan.retained.len(), expected_retained);
    }
}
