// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests driving a spool on disk through the public API.
use baobab::entry::encode_entry;
use baobab::identity::KeyHalf;
use baobab::lipmaa::cert_pool;
use baobab::{Fetched, Format, Options, Scope, Secret, Store, StoreError, Table, YamfHash};
use tempfile::TempDir;

fn open_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    (dir, store)
}

fn append_log(store: &Store, alias: &str, count: u64) -> String {
    let author = store.create_identity(alias, None).unwrap();
    for index in 1..=count {
        store
            .append(format!("Entry: {index}").as_bytes(), alias, &Options::default())
            .unwrap();
    }
    author
}

fn binary_options() -> Options {
    Options {
        format: Format::Binary,
        ..Options::default()
    }
}

#[test]
fn first_entry_of_a_new_log() {
    let (_dir, store) = open_store();
    store.create_identity("testy", None).unwrap();

    let entry = store
        .append(b"An entry for testing", "testy", &Options::default())
        .unwrap();

    assert_eq!(entry.seq_num().as_u64(), 1);
    assert_eq!(entry.log_id().as_u64(), 0);
    assert_eq!(entry.payload_size(), 20);
    assert!(entry.backlink().is_none());
    assert!(entry.lipmaa_link().is_none());

    // The stored entry passes revalidation on read
    let options = Options {
        revalidate: true,
        ..Options::default()
    };
    let fetched = store.log_entry("testy", 1, &options).unwrap();
    assert_eq!(fetched.entry(), Some(&entry));
    assert_eq!(fetched.payload(), Some(&b"An entry for testing"[..]));
}

#[test]
fn hash_chain_over_appended_entries() {
    let (_dir, store) = open_store();
    append_log(&store, "testy", 14);

    let log = store.full_log("testy", &Options::default()).unwrap();
    assert_eq!(log.len(), 14);

    let canonical: Vec<Vec<u8>> = log
        .iter()
        .map(|fetched| {
            encode_entry(fetched.entry().unwrap())
                .unwrap()
                .into_bytes()
        })
        .collect();

    for (index, fetched) in log.iter().enumerate() {
        let entry = fetched.entry().unwrap();
        let seq_num = entry.seq_num();
        assert_eq!(seq_num.as_u64(), index as u64 + 1);

        if let Some(backlink_seq) = seq_num.backlink_seq_num() {
            let expected = YamfHash::new(&canonical[backlink_seq.as_u64() as usize - 1]);
            assert_eq!(entry.backlink(), Some(&expected));
        }

        if seq_num.is_lipmaa_required() {
            let lipmaa_seq = seq_num.lipmaa_seq_num().unwrap();
            let expected = YamfHash::new(&canonical[lipmaa_seq.as_u64() as usize - 1]);
            assert_eq!(entry.lipmaa_link(), Some(&expected));
        }
    }
}

#[test]
fn certificate_pool_queries() {
    let (_dir, store) = open_store();
    let author = append_log(&store, "testy", 14);

    assert_eq!(store.max_seqnum("testy", &Options::default()).unwrap(), 14);
    assert_eq!(
        store.all_seqnum("testy", &Options::default()).unwrap(),
        (1..=14).collect::<Vec<u64>>()
    );

    // Verifying entry 5 inside this log takes exactly 8 stored entries
    let at = store.log_at(&author, 5, &Options::default()).unwrap();
    assert_eq!(at.len(), 8);

    let pool: Vec<u64> = cert_pool(5).into_iter().filter(|seq| *seq <= 14).collect();
    let retrieved: Vec<u64> = at
        .iter()
        .rev()
        .map(|fetched| fetched.entry().unwrap().seq_num().as_u64())
        .collect();
    assert_eq!(retrieved, pool);

    assert_eq!(
        store.certificate_pool(&author, 5, &Options::default()).unwrap(),
        pool
    );
}

#[test]
fn stored_info_lists_all_logs() {
    let (_dir, store) = open_store();
    let author = append_log(&store, "testy", 14);

    let log_1 = Options {
        log_id: 1,
        ..Options::default()
    };
    let log_1337 = Options {
        log_id: 1337,
        ..Options::default()
    };
    store.append(b"Another log", "testy", &log_1).unwrap();
    store.append(b"A far away log", "testy", &log_1337).unwrap();

    assert_eq!(
        store.stored_info("default").unwrap(),
        vec![
            (author.clone(), 0, 14),
            (author.clone(), 1, 1),
            (author.clone(), 1337, 1),
        ]
    );
}

#[test]
fn compaction_preserves_verifiability() {
    let (_dir, store) = open_store();
    let author = append_log(&store, "testy", 14);

    let before = store
        .log_range(&author, 2, 14, &Options::default())
        .unwrap();
    assert_eq!(before.len(), 13);

    let deleted = store.compact(&author, &Options::default()).unwrap();
    let deleted_seqs: Vec<u64> = deleted.iter().map(|(seq, _)| *seq).collect();
    assert_eq!(deleted_seqs, vec![2, 3, 5, 6, 7, 8, 9, 10, 11, 12]);
    assert!(deleted.iter().all(|(_, outcome)| outcome.is_ok()));

    // Only the certificate pool of the latest entry survives
    let after = store
        .log_range(&author, 2, 14, &Options::default())
        .unwrap();
    assert_eq!(after.len(), 3);

    assert!(matches!(
        store.log_entry(&author, 2, &Options::default()),
        Err(StoreError::NotFound)
    ));

    // The log head is still fully verifiable
    let head_pool = store.log_at(&author, 14, &Options::default()).unwrap();
    let seqs: Vec<u64> = head_pool
        .iter()
        .map(|fetched| fetched.entry().unwrap().seq_num().as_u64())
        .collect();
    assert_eq!(seqs, vec![1, 4, 13, 14]);

    // Compacting again deletes nothing further
    assert!(store.compact(&author, &Options::default()).unwrap().is_empty());
}

#[test]
fn improper_ranges_are_rejected() {
    let (_dir, store) = open_store();
    let author = append_log(&store, "testy", 3);

    assert!(matches!(
        store.log_range(&author, 1, 3, &Options::default()),
        Err(StoreError::ImproperRange)
    ));
    assert!(matches!(
        store.log_range(&author, 3, 2, &Options::default()),
        Err(StoreError::ImproperRange)
    ));
}

#[test]
fn binary_import_round_trips() {
    let (_dir, remote) = open_store();
    let author = append_log(&remote, "remote", 2);

    let binaries: Vec<Vec<u8>> = (1..=2)
        .map(|seq| {
            remote
                .log_entry(&author, seq, &binary_options())
                .unwrap()
                .into_binary()
                .unwrap()
        })
        .collect();

    let (_dir, local) = open_store();
    let outcomes = local.import_binaries(&binaries, &Options::default());
    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert!(outcome.is_ok());
    }

    // Retrieval returns bytes identical to the imported input
    let bytes = local
        .log_entry(&author, 1, &binary_options())
        .unwrap()
        .into_binary()
        .unwrap();
    assert_eq!(bytes, binaries[0]);

    // Importing the same binaries again is accepted without replace
    let outcomes = local.import_binaries(&binaries, &Options::default());
    assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
}

#[test]
fn conflicting_import_is_rejected() {
    let (_dir, left) = open_store();
    let secret = {
        left.create_identity("forker", None).unwrap();
        left.identity_key("forker", KeyHalf::Secret).unwrap()
    };
    left.append(b"left version", "forker", &Options::default())
        .unwrap();

    let (_dir, right) = open_store();
    right
        .create_identity("forker", Some(Secret::Raw(&secret)))
        .unwrap();
    let author = right
        .append(b"right version", "forker", &Options::default())
        .unwrap()
        .author()
        .to_base62();

    let left_binary = left
        .log_entry(&author, 1, &binary_options())
        .unwrap()
        .into_binary()
        .unwrap();
    let right_binary = right
        .log_entry(&author, 1, &binary_options())
        .unwrap()
        .into_binary()
        .unwrap();

    let (_dir, local) = open_store();
    assert!(local.import_binaries(&[&left_binary], &Options::default())[0].is_ok());

    // Same position, different bytes: rejected with and without replace
    let outcomes = local.import_binaries(&[&right_binary], &Options::default());
    assert!(matches!(outcomes[0], Err(StoreError::Conflict)));

    let replace = Options {
        replace: true,
        ..Options::default()
    };
    let outcomes = local.import_binaries(&[&right_binary], &replace);
    assert!(matches!(outcomes[0], Err(StoreError::Conflict)));
}

#[test]
fn import_with_missing_predecessors_is_deferred() {
    let (_dir, remote) = open_store();
    let author = append_log(&remote, "remote", 3);

    let second = remote
        .log_entry(&author, 2, &binary_options())
        .unwrap()
        .into_binary()
        .unwrap();

    let (_dir, local) = open_store();
    let outcomes = local.import_binaries(&[&second], &Options::default());
    assert!(outcomes[0].is_ok());

    // The entry is stored but its certificate path is incomplete
    assert_eq!(local.max_seqnum(&author, &Options::default()).unwrap(), 2);
    assert_eq!(
        local.certificate_pool(&author, 2, &Options::default()).unwrap(),
        vec![2]
    );
}

#[test]
fn purge_scopes() {
    let (_dir, store) = open_store();
    let author = append_log(&store, "testy", 3);
    let other = store.create_identity("other", None).unwrap();
    let log_1 = Options {
        log_id: 1,
        ..Options::default()
    };
    store.append(b"one more log", "testy", &log_1).unwrap();
    store.append(b"another author", "other", &Options::default()).unwrap();

    // Purge one log of one author
    let info = store
        .purge(Scope::Specific("testy"), Scope::Specific(1), "default")
        .unwrap();
    let mut expected = vec![(author.clone(), 0, 3), (other.clone(), 0, 1)];
    expected.sort();
    assert_eq!(info, expected);

    // Purge one author entirely
    let info = store
        .purge(Scope::Specific("testy"), Scope::All, "default")
        .unwrap();
    assert_eq!(info, vec![(other.clone(), 0, 1)]);

    // Purge a specific log id across all authors
    let info = store
        .purge(Scope::All, Scope::Specific(0), "default")
        .unwrap();
    assert_eq!(info, vec![]);
}

#[test]
fn purge_everything_is_idempotent() {
    let (_dir, store) = open_store();
    append_log(&store, "testy", 14);

    let before = store.current_hash(Table::Content, "default").unwrap();

    let info = store.purge(Scope::All, Scope::All, "default").unwrap();
    assert_eq!(info, vec![]);

    let info = store.purge(Scope::All, Scope::All, "default").unwrap();
    assert_eq!(info, vec![]);

    let after = store.current_hash(Table::Content, "default").unwrap();
    assert_ne!(before, after);
}

#[test]
fn status_changes_only_on_mutation() {
    let (_dir, store) = open_store();
    store.create_identity("testy", None).unwrap();

    let content = store.current_hash(Table::Content, "default").unwrap();
    let identity = store.current_hash(Table::Identity, "default").unwrap();

    // Reads do not move the status
    assert_eq!(
        store.current_hash(Table::Content, "default").unwrap(),
        content
    );
    assert_eq!(
        store.current_hash(Table::Identity, "default").unwrap(),
        identity
    );

    // A content mutation moves only the content status
    store
        .append(b"An entry for testing", "testy", &Options::default())
        .unwrap();
    assert_ne!(
        store.current_hash(Table::Content, "default").unwrap(),
        content
    );
    assert_eq!(
        store.current_hash(Table::Identity, "default").unwrap(),
        identity
    );

    // An identity mutation moves only the identity status
    let content = store.current_hash(Table::Content, "default").unwrap();
    store.create_identity("another", None).unwrap();
    assert_ne!(
        store.current_hash(Table::Identity, "default").unwrap(),
        identity
    );
    assert_eq!(
        store.current_hash(Table::Content, "default").unwrap(),
        content
    );
}

#[test]
fn identity_reference_forms_resolve_identically() {
    let (_dir, store) = open_store();
    let identifier = store.create_identity("testy", None).unwrap();
    let raw = store.identity_key("testy", KeyHalf::Public).unwrap();

    assert_eq!(store.as_base62("testy").unwrap(), identifier);
    assert_eq!(store.as_base62(&identifier).unwrap(), identifier);
    assert_eq!(store.as_base62(raw).unwrap(), identifier);

    let prefix = format!("~{}", &identifier[..8]);
    assert_eq!(store.as_base62(&prefix).unwrap(), identifier);

    // Unknown references fail
    assert!(store.as_base62("nobody").is_err());
    assert!(store.as_base62("~zzzzzzz").is_err());
}

#[test]
fn identity_registry_operations() {
    let (_dir, store) = open_store();

    // Creating from the same secret yields the same identifier
    let identifier = store.create_identity("testy", None).unwrap();
    let secret = store.identity_key("testy", KeyHalf::Secret).unwrap();
    let again = store
        .create_identity("testy", Some(Secret::Raw(&secret)))
        .unwrap();
    assert_eq!(identifier, again);

    // Base62 secrets decode to the same key pair
    let encoded = baobab::base62::encode(&secret);
    let from_encoded = store
        .create_identity("copy", Some(Secret::Base62(&encoded)))
        .unwrap();
    assert_eq!(from_encoded, identifier);

    let identities = store.identities().unwrap();
    assert_eq!(identities.len(), 2);
    assert_eq!(identities[0].0, "copy");
    assert_eq!(identities[1].0, "testy");

    store.rename_identity("copy", "duplicate").unwrap();
    assert!(matches!(
        store.rename_identity("copy", "gone"),
        Err(StoreError::Identity(_))
    ));

    store.drop_identity("duplicate").unwrap();
    assert!(store.drop_identity("duplicate").is_err());

    // Improper key material is rejected
    assert!(store.create_identity("broken", Some(Secret::Raw(&[1, 2, 3]))).is_err());
    assert!(
        store
            .create_identity("broken", Some(Secret::Base62("tooshort")))
            .is_err()
    );
    assert!(store.create_identity("", None).is_err());
    assert!(store.create_identity("~sigil", None).is_err());
}

#[test]
fn append_without_identity_fails() {
    let (_dir, store) = open_store();
    assert!(matches!(
        store.append(b"payload", "nobody", &Options::default()),
        Err(StoreError::Identity(_))
    ));
}

#[test]
fn clumps_are_independent() {
    let (_dir, store) = open_store();
    let author = store.create_identity("testy", None).unwrap();

    let elsewhere = Options {
        clump_id: "elsewhere".to_owned(),
        ..Options::default()
    };
    store.append(b"default clump", "testy", &Options::default()).unwrap();
    store.append(b"other clump", "testy", &elsewhere).unwrap();

    assert_eq!(store.clumps(), vec!["default", "elsewhere"]);
    assert_eq!(store.stored_info("default").unwrap().len(), 1);
    assert_eq!(store.stored_info("elsewhere").unwrap().len(), 1);

    // Both logs started at sequence number 1 independently
    assert_eq!(store.max_seqnum(&author, &Options::default()).unwrap(), 1);
    assert_eq!(store.max_seqnum(&author, &elsewhere).unwrap(), 1);

    store.purge(Scope::All, Scope::All, "default").unwrap();
    assert_eq!(store.stored_info("default").unwrap(), vec![]);
    assert_eq!(store.stored_info("elsewhere").unwrap().len(), 1);

    assert!(store.log_entry(&author, 1, &Options::default()).is_err());
    assert!(store.log_entry(&author, 1, &elsewhere).is_ok());
}

#[test]
fn improper_clump_ids_are_rejected() {
    let (_dir, store) = open_store();
    store.create_identity("testy", None).unwrap();

    for clump_id in ["", "nested/name"] {
        let options = Options {
            clump_id: clump_id.to_owned(),
            ..Options::default()
        };
        assert!(matches!(
            store.append(b"payload", "testy", &options),
            Err(StoreError::ImproperClumpId(_))
        ));
    }
}

#[test]
fn store_export_import_round_trips() {
    let (_dir, original) = open_store();
    let author = append_log(&original, "testy", 5);
    let elsewhere = Options {
        clump_id: "elsewhere".to_owned(),
        ..Options::default()
    };
    original.append(b"other clump", "testy", &elsewhere).unwrap();

    let export_dir = tempfile::tempdir().unwrap();
    original.export_store(export_dir.path()).unwrap();

    let (_dir, copy) = open_store();
    copy.import_store(export_dir.path()).unwrap();

    assert_eq!(copy.identities().unwrap(), original.identities().unwrap());
    assert_eq!(
        copy.stored_info("default").unwrap(),
        original.stored_info("default").unwrap()
    );
    assert_eq!(
        copy.stored_info("elsewhere").unwrap(),
        original.stored_info("elsewhere").unwrap()
    );

    // Entries survive byte-identically and the copy can continue the log
    for seq in 1..=5 {
        assert_eq!(
            copy.log_entry(&author, seq, &binary_options())
                .unwrap()
                .into_binary(),
            original
                .log_entry(&author, seq, &binary_options())
                .unwrap()
                .into_binary()
        );
    }

    let entry = copy.append(b"Entry: 6", "testy", &Options::default()).unwrap();
    assert_eq!(entry.seq_num().as_u64(), 6);
}

#[test]
fn binary_format_appends_payload() {
    let (_dir, store) = open_store();
    store.create_identity("testy", None).unwrap();
    let entry = store
        .append(b"An entry for testing", "testy", &Options::default())
        .unwrap();

    let canonical = encode_entry(&entry).unwrap().into_bytes();
    let fetched = store.log_entry("testy", 1, &binary_options()).unwrap();

    match fetched {
        Fetched::Binary(bytes) => {
            assert!(bytes.starts_with(&canonical));
            assert!(bytes.ends_with(b"An entry for testing"));
            assert_eq!(bytes.len(), canonical.len() + 20);
        }
        Fetched::Entry { .. } => panic!("expected binary shape"),
    }
}
