//! Parse sessions
//!
//! A [`SchemaParser`] runs one session per call to [`SchemaParser::parse`]:
//! it loads the root schema and everything reachable from it depth-first,
//! then extracts, resolves and assembles. All session state (the import
//! chain tracker, loaded documents, errors and warnings) lives in a value
//! owned by that call.

use std::path::{Path, PathBuf};

use super::assemble::{assemble, SessionOutput};
use super::extract::extract;
use super::references::{extract_references, ReferenceKind};
use super::resolve::{resolve, ComponentTable, PrimaryScope};
use super::tracker::ImportChainTracker;
use super::LoadedSchema;
use crate::error::{FileError, Result, Warning};
use crate::limits::Limits;
use crate::loaders::{FileLoader, SchemaLoader};
use crate::locations::SchemaLocationResolver;
use crate::namespaces::NamespaceContext;
use crate::settings::Settings;
use crate::structure::SchemaStructure;

/// Parser for multi-file schema sets
#[derive(Debug, Clone)]
pub struct SchemaParser<L = FileLoader> {
    settings: Settings,
    loader: L,
    resolver: SchemaLocationResolver,
}

impl SchemaParser<FileLoader> {
    /// Create a parser reading from the file system
    pub fn new(settings: Settings) -> Self {
        let loader = FileLoader::new().with_limits(settings.limits.clone());
        Self::with_loader(settings, loader)
    }
}

impl Default for SchemaParser<FileLoader> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// How a document was reached
#[derive(Debug, Clone)]
struct Via {
    kind: ReferenceKind,
    /// `namespace` of an import
    namespace: Option<String>,
    /// Effective namespace of the referencing document
    includer_namespace: Option<String>,
}

/// Namespace context fixed by the first loaded document
#[derive(Debug, Clone, Default)]
struct Primary {
    target_namespace: Option<String>,
    namespaces: NamespaceContext,
}

#[derive(Debug)]
struct Session {
    tracker: ImportChainTracker,
    schemas: Vec<LoadedSchema>,
    errors: Vec<FileError>,
    warnings: Vec<Warning>,
    primary: Option<Primary>,
}

impl Session {
    fn new(limits: &Limits) -> Self {
        Self {
            tracker: ImportChainTracker::new(limits),
            schemas: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            primary: None,
        }
    }

    fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn fail(&mut self, path: &Path, error: impl std::fmt::Display) {
        log::error!("failed to load {}: {}", path.display(), error);
        self.errors.push(FileError::new(path, error));
    }
}

impl<L: SchemaLoader> SchemaParser<L> {
    /// Create a parser with a custom loader
    pub fn with_loader(settings: Settings, loader: L) -> Self {
        let resolver = SchemaLocationResolver::new(settings.search_roots.iter().cloned());
        Self {
            settings,
            loader,
            resolver,
        }
    }

    /// Session settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse the schema set rooted at `root`.
    ///
    /// Files that cannot be read or parsed, the root included, are recorded
    /// in [`SchemaStructure::errors`] and skipped. A cycle in the reference
    /// graph and exceeded limits on chain depth or component count are
    /// fatal.
    pub fn parse(&self, root: impl AsRef<Path>) -> Result<SchemaStructure> {
        let root = root.as_ref();
        let mut session = Session::new(&self.settings.limits);

        let root_file = match root.canonicalize() {
            Ok(path) => {
                self.visit(&path, None, &mut session)?;
                path
            }
            Err(e) => {
                session.fail(root, format!("Failed to read file '{}': {}", root.display(), e));
                root.to_path_buf()
            }
        };

        self.finish(root_file, session)
    }

    fn visit(&self, path: &Path, via: Option<&Via>, session: &mut Session) -> Result<()> {
        if !session.tracker.enter(path)? {
            log::debug!("{} already loaded", path.display());
            return Ok(());
        }

        log::debug!(
            "loading {} at import depth {}",
            path.display(),
            session.tracker.chain().len()
        );
        let document = match self.loader.load(path) {
            Ok(document) => document,
            Err(e) => {
                session.fail(path, e);
                session.tracker.exit(path);
                return Ok(());
            }
        };
        log::info!("loaded {}", path.display());

        let mut schema = LoadedSchema::new(document);
        if let Some(via) = via {
            self.apply_namespace(&mut schema, via, session);
        }

        match session.primary {
            None => {
                session.primary = Some(Primary {
                    target_namespace: schema.document.target_namespace.clone(),
                    namespaces: schema.document.namespaces.clone(),
                });
            }
            Some(ref mut primary) => {
                let added = primary.namespaces.merge_additive(&schema.document.namespaces);
                if added > 0 {
                    log::debug!("merged {} prefixes from {}", added, path.display());
                }
            }
        }

        let (references, warnings) = extract_references(&schema.document, &self.resolver);
        for warning in warnings {
            session.warn(warning);
        }
        schema.references = references.clone();
        let includer_namespace = schema.effective_namespace.clone();
        session.schemas.push(schema);

        for reference in &references {
            if let Some(ref target) = reference.resolved_path {
                let via = Via {
                    kind: reference.kind,
                    namespace: reference.namespace.clone(),
                    includer_namespace: includer_namespace.clone(),
                };
                self.visit(target, Some(&via), session)?;
            }
        }

        session.tracker.exit(path);
        Ok(())
    }

    /// Check the document's namespace against the reference that reached
    /// it; a no-namespace document included into a namespace adopts it.
    fn apply_namespace(&self, schema: &mut LoadedSchema, via: &Via, session: &mut Session) {
        let declared = schema.document.target_namespace.clone();
        let expected = if via.kind.is_same_namespace() {
            via.includer_namespace.clone()
        } else {
            via.namespace.clone()
        };
        if declared == expected {
            return;
        }

        if via.kind.is_same_namespace() && declared.is_none() && self.settings.chameleon_includes {
            log::debug!(
                "{} adopts namespace {:?} through {}",
                schema.path().display(),
                expected,
                via.kind
            );
            schema.effective_namespace = expected;
            schema.chameleon = true;
            return;
        }

        session.warn(Warning::NamespaceMismatch {
            file: schema.path().to_path_buf(),
            reference: via.kind.to_string(),
            expected,
            found: declared,
        });
    }

    fn finish(&self, root_file: PathBuf, mut session: Session) -> Result<SchemaStructure> {
        for schema in &mut session.schemas {
            schema.extracted = extract(&schema.document, schema.effective_namespace.as_deref());
            for warning in &schema.extracted.warnings {
                log::warn!("{}", warning);
            }
            session.warnings.extend(schema.extracted.warnings.iter().cloned());
        }

        let (table, duplicates) = ComponentTable::build(&session.schemas, self.settings.resolve_redefines);
        self.settings.limits.check_schema_components(table.len())?;
        session.warnings.extend(duplicates);

        let primary = session.primary.take().unwrap_or_default();
        let mut resolution = resolve(
            &table,
            &session.schemas,
            PrimaryScope {
                namespaces: &primary.namespaces,
                target_namespace: primary.target_namespace.as_deref(),
            },
        );
        session.warnings.append(&mut resolution.warnings);

        log::info!(
            "parsed {}: {} files, {} components, {} errors, {} warnings",
            root_file.display(),
            session.schemas.len(),
            table.len(),
            session.errors.len(),
            session.warnings.len()
        );

        Ok(assemble(SessionOutput {
            root_file,
            target_namespace: primary.target_namespace,
            namespaces: primary.namespaces,
            schemas: session.schemas,
            table,
            resolution,
            errors: session.errors,
            warnings: session.warnings,
        }))
    }
}
