#![cfg(feature = "serde")]

use spardiff::{
    ConstVector, DenseMatrix, DenseVector, Error, ExportOptions, JsonFile, Real, SparseMatrix,
    SparseVector,
};

#[test]
fn sparse_vector_json_layout() {
    let v = SparseVector::<f64>::from_triplets(&[5, 2], &[-1.0, 3.0], 8).unwrap();
    let json = serde_json::to_string(&v).unwrap();
    assert_eq!(json, r#"{"Index":[2,5],"Value":[3.0,-1.0],"Length":8}"#);

    let back: SparseVector<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.dim(), 8);
    assert_eq!(back.indices(), vec![2, 5]);
}

#[test]
fn dense_vector_accepts_missing_index() {
    let v: DenseVector<f64> =
        serde_json::from_str(r#"{"Value":[1.0,0.0,2.0],"Length":3}"#).unwrap();
    assert_eq!(v.values(), vec![1.0, 0.0, 2.0]);

    // zeros are not written
    let json = serde_json::to_string(&v).unwrap();
    assert_eq!(json, r#"{"Index":[0,2],"Value":[1.0,2.0],"Length":3}"#);
}

#[test]
fn derivatives_are_not_serialized() {
    let mut v = SparseVector::<Real>::from_triplets(&[0], &[2.0], 2).unwrap();
    spardiff::vector::declare_variables(&mut v, 1);
    let json = serde_json::to_string(&v).unwrap();
    let back: SparseVector<Real> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.const_at(0).gradient(), &[] as &[f64]);
    assert_eq!(back.value_at(0), 2.0);
}

#[test]
fn malformed_json_is_rejected() {
    let err =
        serde_json::from_str::<SparseVector<f64>>(r#"{"Index":[0,1],"Value":[1.0],"Length":3}"#);
    assert!(err.is_err());
    let err =
        serde_json::from_str::<SparseVector<f64>>(r#"{"Index":[4],"Value":[1.0],"Length":3}"#);
    assert!(err.is_err());
}

#[test]
fn overflowing_matrix_shape_is_rejected() {
    let json = r#"{"Index":[],"Value":[],"Rows":4294967296,"Cols":4294967296}"#;
    let err = serde_json::from_str::<SparseMatrix<f64>>(json).unwrap_err();
    assert!(err.to_string().contains("overflows"), "{err}");
}

#[test]
fn matrix_json_uses_logical_row_major_indices() {
    let m = SparseMatrix::<f64>::from_triplets(2, 3, &[0, 1], &[2, 0], &[5.0, 7.0]).unwrap();
    let json = serde_json::to_string(&m.t()).unwrap();
    assert_eq!(json, r#"{"Index":[1,4],"Value":[7.0,5.0],"Rows":3,"Cols":2}"#);

    let back: DenseMatrix<f64> = serde_json::from_str(&json).unwrap();
    assert!(back.equals(&m.t(), 0.0));
}

#[test]
fn json_files_round_trip_and_reset_on_failure() {
    let dir = std::env::temp_dir().join("spardiff-json-tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}-v.json.gz", std::process::id()));

    let v = SparseVector::<f64>::from_triplets(&[1], &[4.5], 4).unwrap();
    v.export_json(&path, &ExportOptions::compressed()).unwrap();
    let mut w = SparseVector::<f64>::null(0);
    w.import_json(&path).unwrap();
    assert_eq!(w.values(), v.values());

    std::fs::write(&path, "{ not json").unwrap();
    let mut w = SparseVector::<f64>::from_triplets(&[0], &[1.0], 2).unwrap();
    assert!(matches!(w.import_json(&path), Err(Error::Json(_))));
    assert_eq!(w.dim(), 0);
    std::fs::remove_file(&path).unwrap();
}
