//! アクションディスパッチャー
//!
//! アクション名 + ペイロードから結果を作る純粋関数。I/Oも共有状態も持たない。
//! 未知のアクションはエラーにせず汎用の応答を返す。

use crate::common::error::DispatchError;
use serde_json::{json, Map, Value};

/// 強制失敗フラグのキー
pub const FORCE_FAIL_KEY: &str = "force_fail";

/// 強制失敗時のメッセージ
pub const FORCED_FAILURE_MESSAGE: &str = "forced failure requested: payload.force_fail=true";

/// JSON値の真偽判定
///
/// null / false / 0 / 空文字列 / 空配列 / 空オブジェクト を偽とする。
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// 配列・オブジェクト以外（欠落含む）は空として数える
fn entry_count(payload: &Map<String, Value>, key: &str) -> usize {
    match payload.get(key) {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(fields)) => fields.len(),
        _ => 0,
    }
}

/// アクションを実行する
///
/// # Returns
/// * `Ok(Value)` - アクション結果（常にJSONオブジェクト）
/// * `Err(DispatchError::Business)` - `payload.force_fail` が真
pub fn dispatch(
    action: &str,
    dataset_id: &str,
    payload: &Map<String, Value>,
) -> Result<Value, DispatchError> {
    if payload.get(FORCE_FAIL_KEY).is_some_and(is_truthy) {
        return Err(DispatchError::business(FORCED_FAILURE_MESSAGE));
    }

    let result = match action {
        "summarize" => {
            let rows = entry_count(payload, "rows");
            json!({
                "summary": format!("{} records processed", rows),
                "rows_processed": rows,
                "dataset": dataset_id,
            })
        }
        "count" => json!({
            "count": entry_count(payload, "items"),
            "dataset": dataset_id,
        }),
        "validate" => json!({
            "valid": true,
            "dataset": dataset_id,
            "checks_passed": ["schema", "constraints", "duplicates"],
        }),
        other => json!({
            "message": format!("Action '{}' executed successfully", other),
            "dataset": dataset_id,
            "payload_keys": payload.keys().collect::<Vec<_>>(),
        }),
    };

    Ok(result)
}
