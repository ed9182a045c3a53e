use digest::Mac;

/// Single-iteration SP800-108 counter-mode KDF as SMB3 uses it: the MAC is
/// run over `BE32(1) || label || 0x00 || context || BE32(128)` and the
/// leftmost `key_size` bytes of the output become the derived key.
///
/// `mac` arrives already keyed with the KDF key; the caller picks label and
/// context per dialect.
pub fn derive_key<M: Mac>(mac: M, label: &[u8], context: &[u8], key_size: usize) -> Vec<u8> {
    let output = mac
        .chain_update(1u32.to_be_bytes())
        .chain_update(label)
        .chain_update([0u8])
        .chain_update(context)
        .chain_update(128u32.to_be_bytes())
        .finalize()
        .into_bytes();
    output[..key_size.min(output.len())].to_vec()
}
