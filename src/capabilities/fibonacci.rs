use serde_json::{json, Value};

use crate::error::{FabricError, Result};
use crate::satellite::capability::Capability;

/// The classic demonstration payload.
pub struct Fibonacci;

// naive recursive implementation, deliberately expensive for larger inputs
fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}

impl Capability for Fibonacci {
    fn execute(&self, input: Value) -> Result<Value> {
        let n = input.as_u64().ok_or_else(|| {
            FabricError::Capability(format!(
                "fibonacci expects a non-negative integer, got {}",
                input
            ))
        })?;
        if n > 92 {
            return Err(FabricError::Capability(format!(
                "fibonacci({}) overflows a u64",
                n
            )));
        }
        Ok(json!(fibonacci(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let fib = Fibonacci;
        assert_eq!(fib.execute(json!(0)).unwrap(), json!(0));
        assert_eq!(fib.execute(json!(1)).unwrap(), json!(1));
        assert_eq!(fib.execute(json!(10)).unwrap(), json!(55));
        assert_eq!(fib.execute(json!(20)).unwrap(), json!(6765));
    }

    #[test]
    fn non_integer_input_is_rejected() {
        let fib = Fibonacci;
        assert!(fib.execute(json!("ten")).is_err());
        assert!(fib.execute(json!(-3)).is_err());
        assert!(fib.execute(json!(null)).is_err());
    }

    #[test]
    fn overflowing_input_is_rejected() {
        let fib = Fibonacci;
        assert!(fib.execute(json!(93)).is_err());
    }
}
