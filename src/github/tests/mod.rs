//! Unit tests for repository locators and pull request identifiers.
