use std::io::Write;

use star::case::case01;
use star::index::case01 as index01;
use star::replay::case01 as replay01;

fn write_csv(lines: &[String]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(f, "{line}").unwrap();
    }
    f.flush().unwrap();
    f
}

#[test]
fn case01_csv_to_encode_to_index_to_replay_round_trips() {
    let mut lines = vec!["Date,Open,High,Low,Close,Volume".to_string()];
    for i in 0..1024i64 {
        let day = 1 + i;
        lines.push(format!(
            "1970-{:02}-{:02},{},{},{},{},{}",
            1 + (day / 28) % 12,
            1 + (day % 28),
            100.0 + i as f64,
            101.0 + i as f64,
            99.0 + i as f64,
            100.5 + i as f64,
            1000 + i
        ));
    }
    let file = write_csv(&lines);

    let bars = case01::read_csv(file.path(), 100, None).unwrap();
    assert_eq!(bars.len(), 1024);

    let blob = case01::encode(&bars, 100);
    assert_eq!(case01::decode(&blob).unwrap(), bars);

    let index = index01::build(&blob, 128).unwrap();
    assert_eq!(index.anchors[0].row, 0);
    assert_eq!(index.anchors.last().unwrap().row, 1023);

    let index_bytes = index01::write(&index);
    let reloaded = index01::read(&index_bytes).unwrap();

    let out = replay01::replay(&blob, &reloaded, replay01::Seek::Row(500), 5).unwrap();
    assert_eq!(out.len(), 5);
    assert_eq!(out[0].0, 500);
    assert_eq!(out[0].1, bars[500]);
    assert_eq!(out[4].1, bars[504]);
}

#[test]
fn case01_skips_header_and_unparseable_rows() {
    let lines = vec![
        "Date,Open,High,Low,Close,Volume".to_string(),
        "1970-01-01,100,110,90,105,1000".to_string(),
        "not-a-date,1,2,3,4,5".to_string(),
        "1970-01-02,101,111,91,106,1001".to_string(),
    ];
    let file = write_csv(&lines);
    let bars = case01::read_csv(file.path(), 1, None).unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].d_days, 0);
    assert_eq!(bars[1].d_days, 1);
}
