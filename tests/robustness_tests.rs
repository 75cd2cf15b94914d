use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_malformed_csv_handling() {
    let output_path = std::path::PathBuf::from("robustness_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["op", "amount", "product", "code"]).unwrap();

    // Valid coin
    wtr.write_record(["insert", "10", "", ""]).unwrap();
    // Unknown operation
    wtr.write_record(["refuel", "1", "", ""]).unwrap();
    // Insert without an amount (required)
    wtr.write_record(["insert", "", "", ""]).unwrap();
    // Valid coin again
    wtr.write_record(["insert", "10", "", ""]).unwrap();
    // Valid selection, but 20 < list price 25
    wtr.write_record(["select", "", "A1", ""]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("vendo"));
    cmd.arg(&output_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stderr(predicate::str::contains("Error applying operation"))
        // Nothing vended: stock untouched
        .stdout(predicate::str::contains("A1,Cola,25,10,false"));

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_invalid_data_types() {
    let output_path = std::path::PathBuf::from("data_type_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["op", "amount", "product", "code"]).unwrap();

    // Text in the amount field
    wtr.write_record(["insert", "not_a_number", "", ""]).unwrap();
    // Valid flow: 25 in coins, buy the cola
    wtr.write_record(["insert", "10", "", ""]).unwrap();
    wtr.write_record(["insert", "10", "", ""]).unwrap();
    wtr.write_record(["insert", "5", "", ""]).unwrap();
    wtr.write_record(["select", "", "A1", ""]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("vendo"));
    cmd.arg(&output_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stdout(predicate::str::contains("A1,Cola,25,9,false"));

    std::fs::remove_file(output_path).ok();
}
