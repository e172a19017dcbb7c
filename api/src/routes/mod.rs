pub mod admin;
pub mod answer;
pub mod ingest;
pub mod query;

use contextor::ContextorError;

/// Validates an optional client-supplied fan-out; `0` is rejected downstream.
pub(crate) fn fan_out(k: Option<i64>) -> Result<Option<usize>, ContextorError> {
    k.map(|v| {
        usize::try_from(v)
            .map_err(|_| ContextorError::InvalidInput(format!("k must be a positive integer, got {v}")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_k_is_invalid() {
        assert!(matches!(fan_out(Some(-1)), Err(ContextorError::InvalidInput(_))));
        assert_eq!(fan_out(Some(4)).unwrap(), Some(4));
        assert_eq!(fan_out(None).unwrap(), None);
    }
}
