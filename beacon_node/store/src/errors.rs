use ssz::DecodeError;

#[derive(Debug)]
pub enum Error {
    SszDecodeError(DecodeError),
    DBError { message: String },
    /// The bytes read back from a column did not start with the column's own key, i.e. the DB
    /// handed back a value for a different column than the one asked for.
    DBColumnMismatch { expected: String, found: String },
    KeyNotFound,
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::SszDecodeError(e)
    }
}

impl From<leveldb::error::Error> for Error {
    fn from(e: leveldb::error::Error) -> Self {
        Error::DBError { message: e.to_string() }
    }
}
