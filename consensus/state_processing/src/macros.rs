/// Returns an `Err(BlockOperationError::invalid($result))` if `$condition` is false.
macro_rules! verify {
    ($condition: expr, $result: expr) => {
        if !$condition {
            return Err(crate::per_block_processing::errors::BlockOperationError::invalid(
                $result,
            ));
        }
    };
}
