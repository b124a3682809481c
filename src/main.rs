//! Command-line interface for xsdgraph

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xsdgraph::{SchemaParser, SchemaStructure, Selection, Settings};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdgraph")]
#[command(author, version, about = "Multi-file XML Schema structure and dependency tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args, Debug)]
struct ParseArgs {
    /// Path to the root XSD schema file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Extra directory searched for schema locations (repeatable)
    #[arg(short = 'I', long = "search-dir", value_name = "DIR")]
    search_dirs: Vec<PathBuf>,

    /// Keep redefined components instead of their redefinitions
    #[arg(long)]
    no_redefines: bool,

    /// Do not let included no-namespace schemas adopt the includer's namespace
    #[arg(long)]
    no_chameleon: bool,
}

#[cfg(feature = "cli")]
impl ParseArgs {
    fn parse_schema(&self) -> xsdgraph::Result<SchemaStructure> {
        let settings = Settings::new()
            .with_search_roots(self.search_dirs.iter().cloned())
            .with_resolve_redefines(!self.no_redefines)
            .with_chameleon_includes(!self.no_chameleon);
        SchemaParser::new(settings).parse(&self.schema)
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect a schema set and display its structure
    Inspect {
        #[command(flatten)]
        args: ParseArgs,

        /// Show detailed information about a specific element
        #[arg(short, long)]
        element: Option<String>,

        /// Show detailed information about a specific type
        #[arg(short = 't', long)]
        type_name: Option<String>,

        /// Show all global elements
        #[arg(long)]
        elements: bool,

        /// Show all named types
        #[arg(long)]
        types: bool,

        /// Output the full structure as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the dependency map of a schema set
    Deps {
        #[command(flatten)]
        args: ParseArgs,

        /// Only show what this component depends on and what depends on it
        #[arg(short, long)]
        component: Option<String>,

        /// Show file-level dependencies instead of component dependencies
        #[arg(long)]
        files: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Extract selected components as JSON
    Select {
        #[command(flatten)]
        args: ParseArgs,

        /// Global element to keep (repeatable)
        #[arg(short, long = "element")]
        elements: Vec<String>,

        /// Complex type to keep (repeatable)
        #[arg(short, long = "complex-type")]
        complex_types: Vec<String>,

        /// Simple type to keep (repeatable)
        #[arg(short, long = "simple-type")]
        simple_types: Vec<String>,

        /// Keep every component of this namespace (repeatable)
        #[arg(short, long = "namespace")]
        namespaces: Vec<String>,

        /// Also keep everything the selection depends on
        #[arg(short = 'd', long)]
        with_dependencies: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            args,
            element,
            type_name,
            elements,
            types,
            json,
        } => cmd_inspect(&args, element, type_name, elements, types, json),
        Commands::Deps {
            args,
            component,
            files,
            json,
        } => cmd_deps(&args, component, files, json),
        Commands::Select {
            args,
            elements,
            complex_types,
            simple_types,
            namespaces,
            with_dependencies,
        } => {
            let selection = Selection {
                elements,
                complex_types,
                simple_types,
                namespaces,
                include_dependencies: with_dependencies,
            };
            cmd_select(&args, &selection)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(
    args: &ParseArgs,
    element: Option<String>,
    type_name: Option<String>,
    show_elements: bool,
    show_types: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let structure = args.parse_schema()?;

    if let Some(name) = element {
        let found = structure
            .find_element(&name)
            .ok_or_else(|| format!("element '{}' not found", name))?;
        if json_output {
            println!("{}", serde_json::to_string_pretty(found)?);
        } else {
            let path = structure.element_path(&name).unwrap_or_default();
            println!("Element: {}", found.name);
            println!("  Path: {}", path.join("/"));
            println!("  Type: {}", found.type_ref.as_deref().unwrap_or("anonymous"));
            println!("  Occurs: {}..{}", found.min_occurs, found.max_occurs);
            println!("  Children: {}", found.children.len());
            println!("  Attributes: {}", found.attributes.len());
            if let Some(ref doc) = found.documentation {
                println!("  Documentation: {}", doc);
            }
        }
        return Ok(());
    }

    if let Some(name) = type_name {
        if let Some(complex) = structure.complex_type(&name) {
            if json_output {
                println!("{}", serde_json::to_string_pretty(complex)?);
            } else {
                println!("Complex type: {}", complex.qname());
                if let Some(ref derivation) = complex.derivation {
                    println!("  Base: {} ({})", derivation.base, derivation.kind);
                }
                for child in &complex.elements {
                    let type_str = child.type_ref.as_deref().unwrap_or("anonymous");
                    println!("  element {} : {}", child.name, type_str);
                }
                for attr in &complex.attributes {
                    let type_str = attr.type_ref.as_deref().unwrap_or("anonymous");
                    println!("  @{} : {} ({})", attr.name, type_str, attr.use_);
                }
            }
        } else if let Some(simple) = structure.simple_type(&name) {
            if json_output {
                println!("{}", serde_json::to_string_pretty(simple)?);
            } else {
                println!("Simple type: {}", simple.qname());
                if let Some(ref base) = simple.base_type {
                    println!("  Base: {}", base);
                }
                for (facet, value) in &simple.restrictions {
                    println!("  {} = {}", facet, value);
                }
                if simple.is_enumeration() {
                    println!("  Enumeration: {}", simple.enumerations.join(", "));
                }
            }
        } else {
            return Err(format!("type '{}' not found", name).into());
        }
        return Ok(());
    }

    if json_output {
        println!("{}", structure.to_json()?);
        return Ok(());
    }

    print_summary(&structure);

    let show_all = !show_elements && !show_types;
    if show_all || show_elements {
        println!("\n=== Global Elements ===");
        for elem in &structure.elements {
            let type_str = elem.type_ref.as_deref().unwrap_or("anonymous");
            println!("  {} : {}", elem.qname(), type_str);
        }
    }

    if show_all || show_types {
        println!("\n=== Complex Types ===");
        for key in structure.complex_types.keys() {
            println!("  {}", key);
        }
        println!("\n=== Simple Types ===");
        for key in structure.simple_types.keys() {
            println!("  {}", key);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_summary(structure: &SchemaStructure) {
    println!("xsdgraph v{}", xsdgraph::VERSION);
    println!();
    println!("Schema Set:");
    println!("  Root: {}", structure.root_file.display());
    match structure.target_namespace {
        Some(ref ns) => println!("  Target Namespace: {}", ns),
        None => println!("  Target Namespace: (none)"),
    }
    println!();
    println!("Files:");
    for file in &structure.files {
        println!(
            "  {} ({} elements, {} complex, {} simple)",
            file.path.display(),
            file.global_elements,
            file.complex_types,
            file.simple_types
        );
    }
    println!();
    let stats = &structure.statistics;
    println!("Statistics:");
    println!("  Elements: {}", stats.total_elements);
    println!("  Complex Types: {}", stats.total_complex_types);
    println!("  Simple Types: {}", stats.total_simple_types);
    println!("  Attributes: {}", stats.total_attributes);
    println!("  Max Depth: {}", stats.max_depth);
    println!("  Unresolved References: {}", stats.unresolved_references);

    if !structure.errors.is_empty() {
        println!("\nErrors:");
        for error in &structure.errors {
            println!("  - {}: {}", error.path.display(), error.message);
        }
    }
    if !structure.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &structure.warnings {
            println!("  - {}", warning);
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_deps(
    args: &ParseArgs,
    component: Option<String>,
    files: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let structure = args.parse_schema()?;

    if files {
        if json_output {
            println!("{}", serde_json::to_string_pretty(&structure.file_dependencies)?);
        } else {
            for (file, deps) in &structure.file_dependencies {
                println!("{}", file);
                for dep in deps {
                    println!("  -> {}", dep);
                }
            }
        }
        return Ok(());
    }

    if let Some(name) = component {
        let name = structure.component_key(&name).unwrap_or(name);
        let uses = structure.dependencies_of(&name);
        let used_by = structure.dependents_of(&name);
        if json_output {
            let value = serde_json::json!({
                "component": name,
                "dependencies": uses,
                "dependents": used_by,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", name);
            for target in uses {
                println!("  -> {}", target);
            }
            for source in used_by {
                println!("  <- {}", source);
            }
        }
        return Ok(());
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&structure.dependencies)?);
    } else {
        for (source, targets) in &structure.dependencies {
            println!("{} -> {}", source, targets.join(", "));
        }
        for dangling in &structure.unresolved_references {
            println!("{} -> {} (unresolved)", dangling.source, dangling.expected);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_select(args: &ParseArgs, selection: &Selection) -> Result<(), Box<dyn std::error::Error>> {
    let structure = args.parse_schema()?;
    let reduced = structure.select(selection);
    println!("{}", reduced.to_json()?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
