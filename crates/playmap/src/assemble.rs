//! Document assembly.
//!
//! Assembly is a pure transform from `(entry markup, file table)` to one
//! self-contained document. Two scripts are placed ahead of anything the
//! author wrote, in this order:
//!
//! 1. the logging shim, tagged with the run id
//! 2. the import map resolving every file name to its ephemeral reference
//!
//! The result is an [`AssembledDocument`], the immutable context of one
//! run that is handed on to the host and the relay.

use std::sync::Arc;

use playmap_core::markup::{inject_prelude, script_element};
use playmap_core::{FileTable, MarkupError, ProjectConfig, RunId};
use playmap_observe::LoggingShim;
use playmap_resource::{
    ImportMap, ModuleResolver, ResolvedModules, ResourceError, ResourceRef, ReverseRegistry,
};
use thiserror::Error;
use tracing::debug;

/// Errors from document assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The project has no entry document.
    #[error("Entry file '{0}' not found in project")]
    MissingEntry(String),

    /// A prelude script could not be rendered.
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// The import map could not be serialized.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

/// Everything one run produced during assembly.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    run: RunId,
    document: String,
    import_map: ImportMap,
    registry: Arc<ReverseRegistry>,
    references: Vec<ResourceRef>,
}

impl AssembledDocument {
    /// The run this document belongs to.
    pub fn run(&self) -> RunId {
        self.run
    }

    /// The serialized document.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Specifier table embedded in the document.
    pub fn import_map(&self) -> &ImportMap {
        &self.import_map
    }

    /// Locator → file name lookup for error attribution.
    pub fn registry(&self) -> &Arc<ReverseRegistry> {
        &self.registry
    }

    /// Every reference minted for this document.
    pub fn references(&self) -> &[ResourceRef] {
        &self.references
    }
}

/// Turns file tables into runnable documents.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    resolver: ModuleResolver,
    entry_file: String,
}

impl DocumentAssembler {
    /// Create an assembler minting through `resolver`.
    pub fn new(resolver: ModuleResolver, project: &ProjectConfig) -> Self {
        Self {
            resolver,
            entry_file: project.entry_file.clone(),
        }
    }

    /// The resolver.
    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Name of the entry document.
    pub fn entry_file(&self) -> &str {
        &self.entry_file
    }

    /// Assemble the project's entry document.
    pub fn assemble(&self, run: RunId, files: &FileTable) -> Result<AssembledDocument, AssemblyError> {
        let entry = files
            .find_by_name(&self.entry_file)
            .ok_or_else(|| AssemblyError::MissingEntry(self.entry_file.clone()))?;
        self.assemble_markup(run, &entry.content, files)
    }

    /// Assemble arbitrary entry markup against a file table.
    ///
    /// If rendering fails, every reference minted for the attempt is
    /// released before the error is returned.
    pub fn assemble_markup(
        &self,
        run: RunId,
        markup: &str,
        files: &FileTable,
    ) -> Result<AssembledDocument, AssemblyError> {
        let ResolvedModules {
            import_map,
            registry,
            references,
        } = self.resolver.build(files.entries());

        let prelude = match prelude(run, &import_map) {
            Ok(prelude) => prelude,
            Err(e) => {
                self.resolver.store().release_all(&references);
                return Err(e);
            }
        };
        let document = inject_prelude(markup, &prelude);

        debug!(
            run = %run,
            bytes = document.len(),
            specifiers = import_map.len(),
            "Assembled document"
        );

        Ok(AssembledDocument {
            run,
            document,
            import_map,
            registry: Arc::new(registry),
            references,
        })
    }
}

/// The shim script followed by the import map script.
pub fn prelude(run: RunId, import_map: &ImportMap) -> Result<String, AssemblyError> {
    let shim = LoggingShim::new(run).script_element()?;
    let map = script_element(&[("type", "importmap")], &import_map.to_script_body()?)?;
    Ok(shim + &map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playmap_core::markup::outline;
    use playmap_core::{ResolverConfig, seed_project};
    use playmap_resource::ResourceStore;

    fn assembler() -> DocumentAssembler {
        let config = ResolverConfig::default();
        let resolver = ModuleResolver::new(ResourceStore::new(&config).into_shared(), &config);
        DocumentAssembler::new(resolver, &ProjectConfig::default())
    }

    fn project(index: &str) -> FileTable {
        let mut files = FileTable::new();
        files.create("1", "index.html", index);
        files.create("2", "main.js", "console.log('hi')");
        files
    }

    #[test]
    fn test_shim_precedes_every_user_script() {
        let markup = "<script>early()</script><html><head><script src=\"main.js\"></script>\
                      </head><body><script type=\"module\">import 'main.js'</script></body></html>";
        let assembled = assembler().assemble(RunId::new(1), &project(markup)).unwrap();
        let document = assembled.document();
        let scripts = outline(document).scripts;

        assert_eq!(scripts.len(), 5);
        assert!(scripts[0].raw(document).contains("data-playmap=\"console\""));
        assert!(scripts[1].raw(document).contains("type=\"importmap\""));
        assert_eq!(scripts[2].raw(document), "<script>");
    }

    #[test]
    fn test_prelude_is_first_in_head() {
        let assembled = assembler()
            .assemble(RunId::new(3), &project("<html><head><title>t</title></head></html>"))
            .unwrap();
        let document = assembled.document();

        assert!(document.starts_with("<html><head><script data-playmap=\"console\">"));
        assert!(document.contains("var RUN = 3;"));
        assert!(document.ends_with("</script><title>t</title></head></html>"));
    }

    #[test]
    fn test_import_map_embedded() {
        let assembled = assembler()
            .assemble(RunId::new(1), &project("<body></body>"))
            .unwrap();

        let map = assembled.import_map();
        assert_eq!(map.len(), 4);
        let locator = map.get("main.js").unwrap();
        assert!(assembled.document().contains(locator.as_str()));
        assert_eq!(assembled.registry().resolve(locator.as_str()), Some("main.js"));
        assert_eq!(assembled.references().len(), 2);
    }

    #[test]
    fn test_missing_entry() {
        let mut files = FileTable::new();
        files.create("1", "main.js", "");

        let err = assembler().assemble(RunId::new(1), &files).unwrap_err();
        assert!(matches!(err, AssemblyError::MissingEntry(name) if name == "index.html"));
    }

    #[test]
    fn test_shape_is_deterministic() {
        let assembler = assembler();
        let files = seed_project();
        let first = assembler.assemble(RunId::new(1), &files).unwrap();
        let second = assembler.assemble(RunId::new(1), &files).unwrap();

        let mut normalized = second.document().to_string();
        for (specifier, reference) in &second.import_map().imports {
            let earlier = first.import_map().get(specifier).unwrap();
            normalized = normalized.replace(reference.as_str(), earlier.as_str());
        }
        assert_eq!(normalized, first.document());
    }
}
