//! Parser Tests
//!
//! Organized by category:
//! - test_statement_identification: Classification of DML statements
//! - test_generated_keys: RETURNING clause rewriting for generated keys
//! - test_tokenizer_properties: Lossless and maximal-munch tokenization
