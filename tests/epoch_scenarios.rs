use epochledger_lib::snapshot::{read_json, write_json};
use epochledger_lib::{
    KeyPair, Ledger, OutputIndex, Sha256, Transaction, TransactionId, TransactionOutput,
    UnsignedTransaction, Utxo, UtxoPool,
};

fn genesis_utxo() -> Utxo {
    Utxo::new(
        TransactionId::new(Sha256::digest(b"genesis")),
        OutputIndex::new(0),
    )
}

fn genesis_pool(owner: &KeyPair, amount: i64) -> UtxoPool {
    let mut pool = UtxoPool::new();
    pool.add(
        genesis_utxo(),
        TransactionOutput::new(amount, owner.public_key()),
    );
    pool
}

fn transfer(from: &KeyPair, utxo: Utxo, amount: i64, to: &KeyPair) -> Transaction {
    UnsignedTransaction::new()
        .claim(utxo)
        .pay(amount, to.public_key())
        .sign(&[from])
        .unwrap()
}

#[test]
fn transfer_to_new_owner() {
    let k1 = KeyPair::generate();
    let k2 = KeyPair::generate();
    let pool = genesis_pool(&k1, 10);
    let t1 = transfer(&k1, genesis_utxo(), 10, &k2);

    let mut ledger = Ledger::new(&pool);
    assert!(ledger.is_valid(&t1));
    assert_eq!(ledger.apply_epoch(&[t1.clone()]), vec![t1.clone()]);

    let mut expected = UtxoPool::new();
    expected.add(
        Utxo::new(*t1.id(), OutputIndex::new(0)),
        TransactionOutput::new(10, k2.public_key()),
    );
    assert_eq!(ledger.pool(), &expected);
}

#[test]
fn transfer_creating_value_leaves_pool_unchanged() {
    let k1 = KeyPair::generate();
    let k2 = KeyPair::generate();
    let pool = genesis_pool(&k1, 10);
    let t1 = transfer(&k1, genesis_utxo(), 15, &k2);

    let mut ledger = Ledger::new(&pool);
    assert!(!ledger.is_valid(&t1));
    assert!(ledger.apply_epoch(&[t1]).is_empty());
    assert_eq!(ledger.pool(), &pool);
}

#[test]
fn split_and_merge_within_one_epoch() {
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();
    let pool = genesis_pool(&alice, 100);

    let split = UnsignedTransaction::new()
        .claim(genesis_utxo())
        .pay(60, bob.public_key())
        .pay(30, alice.public_key())
        .sign(&[&alice])
        .unwrap();
    // Bob's 60 and Alice's 30 go back to Alice, 5 is left as a fee.
    let merge = UnsignedTransaction::new()
        .claim(split.utxo(0))
        .claim(split.utxo(1))
        .pay(85, alice.public_key())
        .sign(&[&bob, &alice])
        .unwrap();

    let mut ledger = Ledger::new(&pool);
    assert_eq!(
        ledger.apply_epoch(&[split.clone(), merge.clone()]),
        vec![split, merge.clone()]
    );
    assert_eq!(ledger.pool().len(), 1);
    assert_eq!(ledger.pool().balances().unwrap()[&alice.public_key()], 85);
    assert_eq!(ledger.pool().total_value(), Some(85));
}

#[test]
fn epoch_from_snapshot_files() {
    let dir = tempfile::tempdir().unwrap();
    let pool_path = dir.path().join("pool.json");
    let batch_path = dir.path().join("batch.json");

    let k1 = KeyPair::generate();
    let k2 = KeyPair::generate();
    let pool = genesis_pool(&k1, 10);
    let batch = vec![
        transfer(&k1, genesis_utxo(), 4, &k2),
        transfer(&k2, genesis_utxo(), 4, &k2),
    ];
    write_json(&pool_path, &pool).unwrap();
    write_json(&batch_path, &batch).unwrap();

    let pool: UtxoPool = read_json(&pool_path).unwrap();
    let batch: Vec<Transaction> = read_json(&batch_path).unwrap();
    let mut ledger = Ledger::new(&pool);
    let accepted = ledger.apply_epoch(&batch);

    assert_eq!(accepted, vec![batch[0].clone()]);
    assert_eq!(ledger.pool().balances().unwrap()[&k2.public_key()], 4);
}
