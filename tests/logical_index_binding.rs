use std::io::Write;

use star::case::case04;
use star::index::logical;
use star::replay::logical as replay_logical;

fn write_file(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "{contents}").unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn case04_csv_round_trips_through_files_and_binds_an_index() {
    let csv = "Transaction_ID,Sender_Address,Receiver_Address,Amount,Transaction_Fee,Timestamp,Block_ID,Mining_Pool,Currency,Transaction_Type,Transaction_Status,Gas_Price_Gwei\n\
t1,0xaaa,0xbbb,1.5,0.01,2024-01-01T00:00:00Z,100,PoolA,BTC,transfer,confirmed,20\n\
t2,0xccc,0xddd,2.5,0.02,2024-01-01T00:01:00Z,101,PoolB,ETH,mint,pending,25\n";
    let file = write_file(csv);

    let rows = case04::read_csv(file.path()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].mining_pool, "PoolA");

    let blob = case04::encode(&rows);
    assert_eq!(case04::decode(&blob).unwrap(), rows);

    let sha = logical::sha256_bytes(&blob);
    let index = logical::build(rows.len() as u32, 1, 1, sha).unwrap();
    let index_bytes = logical::write(b"STARIDX04\0", 4, &index);
    let reloaded = logical::read(b"STARIDX04\0", &index_bytes).unwrap();
    assert_eq!(reloaded.star_sha256, sha);

    let resolved = replay_logical::resolve(&blob, &reloaded, Some(1), None, None, None, 1).unwrap();
    assert_eq!(resolved.target_row, 1);
}

#[test]
fn tampering_with_the_star_blob_breaks_the_index_binding() {
    let sha = logical::sha256_bytes(b"original bytes");
    let index = logical::build(5, 1, 2, sha).unwrap();

    let tampered = b"tampered bytes".to_vec();
    let err = replay_logical::resolve(&tampered, &index, Some(0), None, None, None, 1);
    assert!(err.is_err());
}
