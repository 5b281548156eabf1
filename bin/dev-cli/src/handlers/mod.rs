pub(crate) mod decode;
pub(crate) mod derive_keys;
