//! End-to-end checks of the `ferrite-kernels` binary: output formats, exit
//! codes, and that failures leave stdout empty.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn kernels() -> Command {
    Command::cargo_bin("ferrite-kernels").unwrap()
}

fn json_stdout(args: &[&str], stdin: &str) -> Value {
    let out = kernels().args(args).write_stdin(stdin).assert().success();
    serde_json::from_slice(&out.get_output().stdout).unwrap()
}

// ---------------------------------------------------------------------------
// Flat commands
// ---------------------------------------------------------------------------

#[test]
fn tensor_matmul_record() {
    kernels()
        .args(["tensor", "--mode", "matmul", "--a00", "1", "--a01", "2", "--a10", "3", "--a11", "4",
               "--b00", "5", "--b01", "6", "--b10", "7", "--b11", "8"])
        .assert()
        .success()
        .stdout("c00=19.0 c01=22.0 c10=43.0 c11=50.0\n");
}

#[test]
fn tensor_defaults_are_identities() {
    kernels()
        .args(["tensor", "--mode", "add"])
        .assert()
        .success()
        .stdout("c00=2.0 c01=0.0 c10=0.0 c11=2.0\n");
}

#[test]
fn linear_backward_reference_values() {
    kernels()
        .args(["linear", "--mode", "backward"])
        .assert()
        .success()
        .stdout("dx0=1.0 dx1=1.0 dw00=1.0 dw01=2.0 dw10=1.0 dw11=2.0 db0=1.0 db1=1.0\n");
}

#[test]
fn linear_forward_accepts_negative_flags() {
    kernels()
        .args(["linear", "--mode", "forward", "--x0", "-1", "--b1", "0.5"])
        .assert()
        .success()
        .stdout("y0=-1.0 y1=2.5\n");
}

#[test]
fn mse_loss_and_grad() {
    kernels()
        .args(["mse", "--mode", "loss"])
        .assert()
        .success()
        .stdout("mse=1.0\n");
    kernels()
        .args(["mse", "--mode", "grad", "--p0", "3"])
        .assert()
        .success()
        .stdout("g0=1.0 g1=-0.5 g2=-0.5 g3=-0.5\n");
}

#[test]
fn activation_at_zero() {
    kernels().args(["activation", "--mode", "sigmoid"]).assert().success().stdout("y=0.5\n");
    kernels().args(["activation", "--mode", "tanh"]).assert().success().stdout("y=0.0\n");
    kernels().args(["activation", "--mode", "relu", "--x", "-3"]).assert().success().stdout("y=0.0\n");
    kernels().args(["activation", "--mode", "tanh", "--x", "-12"]).assert().success().stdout("y=-1.0\n");
}

#[test]
fn linreg_fit_and_predict() {
    kernels()
        .args(["linreg", "--mode", "fit", "--x2", "2", "--y2", "4"])
        .assert()
        .success()
        .stdout("coef=2.0 intercept=0.0\n");
    kernels()
        .args(["linreg", "--mode", "predict", "--x", "5", "--coef", "2"])
        .assert()
        .success()
        .stdout("prediction=10.0\n");
}

#[test]
fn unknown_mode_is_rejected_by_the_parser() {
    kernels()
        .args(["tensor", "--mode", "divide"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

// ---------------------------------------------------------------------------
// JSON commands
// ---------------------------------------------------------------------------

#[test]
fn conv2d_identity_kernel() {
    let out = json_stdout(
        &["conv2d", "forward"],
        r#"{"x": [[[1, 2], [3, 4]]], "kernel": [[[[1]]]]}"#,
    );
    assert_eq!(out, serde_json::json!({"output": [[[1.0, 2.0], [3.0, 4.0]]]}));
}

#[test]
fn conv2d_padding_and_stride() {
    let out = json_stdout(
        &["conv2d", "forward"],
        r#"{"x": [[[1, 2, 3], [4, 5, 6], [7, 8, 9]]],
            "kernel": [[[[1, 1, 1], [1, 1, 1], [1, 1, 1]]]],
            "bias": [1], "stride": 2, "padding": 1}"#,
    );
    assert_eq!(out["output"], serde_json::json!([[[13.0, 17.0], [25.0, 29.0]]]));
}

#[test]
fn conv2d_channel_mismatch_exits_with_shape_status() {
    kernels()
        .args(["conv2d", "forward"])
        .write_stdin(r#"{"x": [[[1]]], "kernel": [[[[1]], [[1]]]]}"#)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("shape mismatch"));
}

#[test]
fn batchnorm_standardises() {
    let out = json_stdout(
        &["batchnorm", "forward"],
        r#"{"x": [[1, 10], [3, 30]], "gamma": [1, 1], "beta": [0, 0], "eps": 0}"#,
    );
    assert_eq!(out["output"], serde_json::json!([[-1.0, -1.0], [1.0, 1.0]]));
}

#[test]
fn batchnorm_empty_batch_is_an_error() {
    kernels()
        .args(["batchnorm", "forward"])
        .write_stdin(r#"{"x": [], "gamma": [], "beta": []}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn dropout_eval_is_identity_and_seed_is_reproducible() {
    let out = json_stdout(&["dropout", "forward"], r#"{"x": [1.5, -2.0], "p": 0.9, "training": false}"#);
    assert_eq!(out["output"], serde_json::json!([1.5, -2.0]));

    let payload = r#"{"x": [1, 1, 1, 1, 1, 1, 1, 1], "p": 0.5, "random_state": 42}"#;
    let a = json_stdout(&["dropout", "forward"], payload);
    let b = json_stdout(&["dropout", "forward"], payload);
    assert_eq!(a, b);
}

#[test]
fn missing_field_fails_without_output() {
    kernels()
        .args(["dropout", "forward"])
        .write_stdin(r#"{"p": 0.5}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing field `x`"));
}

#[test]
fn malformed_json_fails_without_output() {
    kernels()
        .args(["conv2d", "forward"])
        .write_stdin("not json")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error: Invalid JSON"));
}

#[test]
fn linear_json_batch_forward() {
    let out = json_stdout(
        &["linear-json", "forward"],
        r#"{"x": [[1, 2], [3, 4]], "weight": [[1, 0], [0, 1]], "bias": [1, 1]}"#,
    );
    assert_eq!(out["output"], serde_json::json!([[2.0, 3.0], [4.0, 5.0]]));
}

#[test]
fn loss_commands() {
    let out = json_stdout(&["loss", "forward"], r#"{"pred": [1, 2], "target": [2, 3]}"#);
    assert_eq!(out["loss"], serde_json::json!(1.0));
    let out = json_stdout(&["loss", "forward"], r#"{"pred": [1, 2], "target": [2, 3], "reduction": "sum"}"#);
    assert_eq!(out["loss"], serde_json::json!(2.0));
    let out = json_stdout(&["loss", "backward"], r#"{"pred": [1, 2], "target": [2, 3]}"#);
    assert_eq!(out["grad"], serde_json::json!([-1.0, -1.0]));
    let out = json_stdout(&["loss", "l1-forward"], r#"{"pred": [1, 2], "target": [2, 4]}"#);
    assert_eq!(out["loss"], serde_json::json!(1.5));
}

#[test]
fn sequential_forward() {
    let out = json_stdout(
        &["sequential", "forward"],
        r#"{"x": [1, -1], "layers": [{"type": "linear", "weight": [[1, 0], [0, 1]], "bias": [0, 0]}, {"type": "relu"}]}"#,
    );
    assert_eq!(out["output"], serde_json::json!([1.0, 0.0]));
}

#[test]
fn adam_zero_lr_returns_state() {
    let out = json_stdout(&["adam", "step"], r#"{"params": [1.0], "grads": [0.1], "lr": 0}"#);
    assert_eq!(out, serde_json::json!({"params": [1.0], "m": [0.0], "v": [0.0], "t": 1}));
}

#[test]
fn tensor_json_helpers() {
    let out = json_stdout(&["tensor-json", "create"], r#"{"data": [[1, 2, 3], [4, 5, 6]]}"#);
    assert_eq!(out["shape"], serde_json::json!([2, 3]));
    let out = json_stdout(&["tensor-json", "zeros"], r#"{"shape": [2]}"#);
    assert_eq!(out["tensor"], serde_json::json!([0.0, 0.0]));
    let out = json_stdout(&["tensor-json", "mean"], r#"{"tensor": [[1, 2], [3, 4]]}"#);
    assert_eq!(out["value"], serde_json::json!(2.5));
}

#[test]
fn regress_fit_predict_score() {
    let out = json_stdout(&["regress", "fit"], r#"{"x": [1, 2, 3], "y": [2, 4, 6]}"#);
    assert_eq!(out, serde_json::json!({"coef": 2.0, "intercept": 0.0}));
    let out = json_stdout(&["regress", "predict"], r#"{"x": [4, 5], "coef": 2.0, "intercept": 1.0}"#);
    assert_eq!(out["predictions"], serde_json::json!([9.0, 11.0]));
    let out = json_stdout(&["regress", "score"], r#"{"x": [1, 2], "y": [2, 4], "coef": 2.0, "intercept": 0.0}"#);
    assert_eq!(out["r2"], serde_json::json!(1.0));
}

#[test]
fn ragged_tensor_is_a_shape_error() {
    for op in ["create", "sum", "mean"] {
        let field = if op == "create" { "data" } else { "tensor" };
        kernels()
            .args(["tensor-json", op])
            .write_stdin(format!(r#"{{"{field}": [[1, 2], [3]]}}"#))
            .assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("row 1"));
    }
}

#[test]
fn rank_two_ones() {
    let out = json_stdout(&["tensor-json", "ones"], r#"{"shape": [2, 3]}"#);
    assert_eq!(out["tensor"], serde_json::json!([[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]));
}

#[test]
fn conv2d_oversized_padding_fails_cleanly() {
    kernels()
        .args(["conv2d", "forward"])
        .write_stdin(r#"{"x": [[[1]]], "kernel": [[[[1]]]], "padding": 18446744073709551615}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn conv2d_empty_kernel_is_rejected() {
    kernels()
        .args(["conv2d", "forward"])
        .write_stdin(r#"{"x": [], "kernel": [[]]}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("kernel dimensions"));
}

#[test]
fn loss_gradients() {
    let out = json_stdout(&["loss", "l1-backward"], r#"{"pred": [3, 1], "target": [1, 2]}"#);
    assert_eq!(out["grad"], serde_json::json!([0.5, -0.5]));
    let out = json_stdout(&["loss", "cross-entropy-backward"], r#"{"logits": [0, 0], "target": 0}"#);
    assert_eq!(out["grad"], serde_json::json!([-0.5, 0.5]));
}

#[test]
fn non_finite_result_is_an_error() {
    kernels()
        .args(["loss", "forward"])
        .write_stdin(r#"{"pred": [1e308], "target": [-1e308]}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("non-finite"));
}
