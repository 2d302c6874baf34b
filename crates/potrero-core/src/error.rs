pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid CUIT {input:?}: expected 11 digits, with or without hyphens")]
    InvalidCuit { input: String },

    #[error("Invalid RENSPA {input:?}: expected NN.NNN.N.NNNNN/NN or a flat 13-digit string")]
    InvalidRenspa { input: String },
}
