use crate::core::{RecordError, Result};
use crate::storage::Counter;

/// Render `prefix` followed by `value` left-padded with zeros to `width`
/// digits. Wider values are kept whole.
pub fn format_sequential(prefix: &str, value: u64, width: usize) -> String {
    format!("{prefix}{value:0width$}")
}

/// Increment `counter_name` and format the new value.
///
/// Any counter failure becomes `AllocationUnavailable`; nothing is returned
/// in that case, not even a partial id.
pub async fn next_sequential(
    counter: &dyn Counter,
    counter_name: &str,
    prefix: &str,
    width: usize,
) -> Result<String> {
    let value = counter.next(counter_name).await.map_err(|e| match e {
        RecordError::AllocationUnavailable { .. } => e,
        other => RecordError::AllocationUnavailable {
            counter: counter_name.to_string(),
            reason: other.to_string(),
        },
    })?;
    Ok(format_sequential(prefix, value, width))
}
