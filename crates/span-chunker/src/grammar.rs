use crate::error::{ChunkerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tree_sitter::{Parser, Tree};

/// Language with a syntax grammar available to the chunker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Go,
    Ruby,
    Cpp,
}

impl Grammar {
    pub const ALL: [Self; 8] = [
        Self::Rust,
        Self::Python,
        Self::JavaScript,
        Self::TypeScript,
        Self::Tsx,
        Self::Go,
        Self::Ruby,
        Self::Cpp,
    ];

    /// Map a file extension (without the dot) to its grammar.
    ///
    /// `None` means the language is not supported, which callers treat as a
    /// normal outcome.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(Self::Rust),
            "py" | "pyw" => Some(Self::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "go" => Some(Self::Go),
            "rb" => Some(Self::Ruby),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Some(Self::Cpp),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Go => "golang",
            Self::Ruby => "ruby",
            Self::Cpp => "cpp",
        }
    }

    /// Conventional artifact name of the grammar, `tree-sitter-<language>.wasm`
    pub fn artifact_name(self) -> String {
        format!("tree-sitter-{}.wasm", self.as_str())
    }

    /// Statically linked Tree-sitter language
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of grammar definitions for the registry
#[async_trait]
pub trait GrammarLoader: Send + Sync {
    async fn load(&self, grammar: Grammar) -> Result<tree_sitter::Language>;
}

/// Loader backed by the grammar crates linked into this binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledGrammars;

#[async_trait]
impl GrammarLoader for BundledGrammars {
    async fn load(&self, grammar: Grammar) -> Result<tree_sitter::Language> {
        Ok(grammar.tree_sitter_language())
    }
}

/// A parser bound to one grammar. Owned by the registry, shared via `Arc`.
pub struct GrammarHandle {
    grammar: Grammar,
    parser: Mutex<Parser>,
}

impl GrammarHandle {
    pub fn new(grammar: Grammar, language: &tree_sitter::Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(language)
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self {
            grammar,
            parser: Mutex::new(parser),
        })
    }

    pub const fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Parse `text` into a syntax tree
    pub fn parse(&self, text: &str) -> Result<Tree> {
        let mut parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        parser
            .parse(text, None)
            .ok_or_else(|| ChunkerError::parse(format!("{} parser produced no tree", self.grammar)))
    }
}

impl std::fmt::Debug for GrammarHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarHandle")
            .field("grammar", &self.grammar)
            .finish_non_exhaustive()
    }
}

type Slot = Arc<OnceCell<Option<Arc<GrammarHandle>>>>;

/// Lazily loads one parser per grammar and caches it for the registry's lifetime.
///
/// Concurrent first requests for the same grammar share a single load. The
/// outcome is memoised either way: a failed load is logged once and the
/// grammar reports "no parser" from then on.
pub struct GrammarRegistry {
    loader: Arc<dyn GrammarLoader>,
    slots: Mutex<HashMap<Grammar, Slot>>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::with_loader(Arc::new(BundledGrammars))
    }

    pub fn with_loader(loader: Arc<dyn GrammarLoader>) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Make sure a load for `extension` has happened or is in flight, and wait for it.
    ///
    /// Extensions without a grammar are a silent no-op.
    pub async fn ensure_loaded(&self, extension: &str) {
        if let Some(grammar) = Grammar::from_extension(extension) {
            self.resolve(grammar).await;
        } else {
            log::debug!("No grammar mapped for extension {extension:?}");
        }
    }

    /// Parser for `extension`, loading it on first use.
    ///
    /// `None` covers both unmapped extensions and failed loads.
    pub async fn get(&self, extension: &str) -> Option<Arc<GrammarHandle>> {
        let grammar = Grammar::from_extension(extension)?;
        self.resolve(grammar).await
    }

    /// Parser for `extension` if its load already completed successfully
    pub fn cached(&self, extension: &str) -> Option<Arc<GrammarHandle>> {
        let grammar = Grammar::from_extension(extension)?;
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(&grammar)?.get().cloned().flatten()
    }

    /// Whether a load for `extension` was ever started
    pub fn was_attempted(&self, extension: &str) -> bool {
        let Some(grammar) = Grammar::from_extension(extension) else {
            return false;
        };
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.contains_key(&grammar)
    }

    fn slot(&self, grammar: Grammar) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(grammar).or_default().clone()
    }

    async fn resolve(&self, grammar: Grammar) -> Option<Arc<GrammarHandle>> {
        let slot = self.slot(grammar);
        slot.get_or_init(|| self.load(grammar)).await.clone()
    }

    async fn load(&self, grammar: Grammar) -> Option<Arc<GrammarHandle>> {
        log::debug!("Loading grammar {} ({})", grammar, grammar.artifact_name());

        let handle = match self.loader.load(grammar).await {
            Ok(language) => GrammarHandle::new(grammar, &language),
            Err(e) => Err(e),
        };

        match handle {
            Ok(handle) => Some(Arc::new(handle)),
            Err(e) => {
                log::warn!(
                    "Grammar {} unavailable ({}), using line chunking: {e}",
                    grammar,
                    grammar.artifact_name()
                );
                None
            }
        }
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts loads and optionally fails them
    struct CountingLoader {
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingLoader {
        fn new(fail: bool, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GrammarLoader for CountingLoader {
        async fn load(&self, grammar: Grammar) -> Result<tree_sitter::Language> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ChunkerError::grammar_load(
                    grammar.artifact_name(),
                    "artifact missing",
                ));
            }
            Ok(grammar.tree_sitter_language())
        }
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Grammar::from_extension("rs"), Some(Grammar::Rust));
        assert_eq!(Grammar::from_extension("RS"), Some(Grammar::Rust));
        assert_eq!(Grammar::from_extension("py"), Some(Grammar::Python));
        assert_eq!(Grammar::from_extension("jsx"), Some(Grammar::JavaScript));
        assert_eq!(Grammar::from_extension("ts"), Some(Grammar::TypeScript));
        assert_eq!(Grammar::from_extension("tsx"), Some(Grammar::Tsx));
        assert_eq!(Grammar::from_extension("go"), Some(Grammar::Go));
        assert_eq!(Grammar::from_extension("rb"), Some(Grammar::Ruby));
        assert_eq!(Grammar::from_extension("cpp"), Some(Grammar::Cpp));
        assert_eq!(Grammar::from_extension("md"), None);
        assert_eq!(Grammar::from_extension(""), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Grammar::from_path("src/main.rs"), Some(Grammar::Rust));
        assert_eq!(Grammar::from_path("app/page.tsx"), Some(Grammar::Tsx));
        assert_eq!(Grammar::from_path("Makefile"), None);
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(Grammar::Go.artifact_name(), "tree-sitter-golang.wasm");
        assert_eq!(Grammar::Python.artifact_name(), "tree-sitter-python.wasm");
    }

    #[test]
    fn test_every_bundled_grammar_builds_a_parser() {
        for grammar in Grammar::ALL {
            let handle = GrammarHandle::new(grammar, &grammar.tree_sitter_language());
            assert!(handle.is_ok(), "{grammar} failed: {:?}", handle.err());
        }
    }

    #[tokio::test]
    async fn test_registry_loads_and_caches() {
        let registry = GrammarRegistry::new();
        assert!(!registry.was_attempted("rs"));
        assert!(registry.cached("rs").is_none());

        let handle = registry.get("rs").await.expect("rust grammar");
        assert_eq!(handle.grammar(), Grammar::Rust);
        assert!(registry.was_attempted("rs"));

        let cached = registry.cached("rs").expect("cached handle");
        assert!(Arc::ptr_eq(&handle, &cached));

        let tree = handle.parse("fn main() {}").unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[tokio::test]
    async fn test_unmapped_extension_is_not_an_error() {
        let loader = CountingLoader::new(false, Duration::ZERO);
        let registry = GrammarRegistry::with_loader(loader.clone());

        registry.ensure_loaded("txt").await;
        assert!(registry.get("txt").await.is_none());
        assert!(!registry.was_attempted("txt"));
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_is_never_retried() {
        let loader = CountingLoader::new(true, Duration::ZERO);
        let registry = GrammarRegistry::with_loader(loader.clone());

        assert!(registry.get("py").await.is_none());
        assert!(registry.get("py").await.is_none());
        registry.ensure_loaded("pyw").await;

        assert!(registry.was_attempted("py"));
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_extensions_sharing_a_grammar_share_the_handle() {
        let loader = CountingLoader::new(false, Duration::ZERO);
        let registry = GrammarRegistry::with_loader(loader.clone());

        let a = registry.get("ts").await.unwrap();
        let b = registry.get("mts").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_share_one_load() {
        let loader = CountingLoader::new(false, Duration::from_millis(50));
        let registry = Arc::new(GrammarRegistry::with_loader(loader.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.get("go").await })
            })
            .collect();

        for task in tasks {
            let handle = task.await.unwrap();
            assert!(handle.is_some(), "concurrent caller saw no parser");
        }
        assert_eq!(loader.calls(), 1);
    }
}
