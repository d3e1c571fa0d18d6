// src/scan/partition.rs
// =============================================================================
// Splits the wordlist into contiguous chunks, one per worker.
//
// chunk size = ceil(words / workers), so every chunk but the last is full
// and the last one may be shorter. With few words this can produce fewer
// chunks than workers; empty chunks are never produced.
// =============================================================================

/// Splits `words` into at most `workers` contiguous, non-empty chunks.
///
/// Order inside each chunk is the order of the input. Concatenating the
/// chunks gives back `words` exactly.
pub fn partition(words: Vec<String>, workers: usize) -> Vec<Vec<String>> {
    if words.is_empty() {
        return Vec::new();
    }

    let workers = workers.max(1);
    let chunk_size = words.len().div_ceil(workers);

    let mut chunks = Vec::with_capacity(words.len().min(workers));
    let mut rest = words.into_iter().peekable();
    while rest.peek().is_some() {
        chunks.push(rest.by_ref().take(chunk_size).collect());
    }
    chunks
}

/// Expands one word into its candidate URLs: one per extension, or the bare
/// word when no extensions are configured.
pub fn candidates(base_url: &str, word: &str, extensions: &[String]) -> Vec<String> {
    if extensions.is_empty() {
        return vec![format!("{}/{}", base_url, word)];
    }

    extensions
        .iter()
        .map(|ext| format!("{}/{}{}", base_url, word, ext))
        .collect()
}
