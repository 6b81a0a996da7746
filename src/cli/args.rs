//! CLI argument parsing

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Import(ImportArgs),
    View(ViewArgs),
    Tree(TreeArgs),
    Link(LinkArgs),
}

#[derive(Debug, Clone, Default)]
pub struct ImportArgs {
    pub input: String,
    pub snapshot: Option<String>,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct ViewArgs {
    pub source: String,
    pub state: Option<String>,
    pub user: Option<String>,
    pub company: Option<String>,
    pub org: Option<String>,
    /// `(category, term)` for the employee grid search.
    pub search: Option<(String, String)>,
    pub dept: Option<String>,
    pub checks: Vec<String>,
    pub sort: String,
    pub top: Option<usize>,
    pub json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TreeArgs {
    pub snapshot: String,
    pub state: Option<String>,
    pub company: Option<String>,
    pub expand: Vec<String>,
    pub collapse: Vec<String>,
    pub dept: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LinkArgs {
    pub kind: String,
    pub emails: Vec<String>,
}

impl Default for ViewArgs {
    fn default() -> Self {
        Self {
            source: String::new(),
            state: None,
            user: None,
            company: None,
            org: None,
            search: None,
            dept: None,
            checks: Vec::new(),
            sort: "sort".to_string(),
            top: None,
            json: false,
        }
    }
}

/// Parse command line arguments
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let command = match args[1].as_str() {
        "import" => Command::Import(parse_import_args(&args[2..])?),
        "view" => Command::View(parse_view_args(&args[2..])?),
        "tree" => Command::Tree(parse_tree_args(&args[2..])?),
        "link" => Command::Link(parse_link_args(&args[2..])?),
        _ => return Err(format!("Unknown command: {}", args[1])),
    };

    Ok(CliArgs { command })
}

fn value_of(args: &[String], i: &mut usize, what: &str) -> Result<String, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{flag} requires {what}"))
}

fn parse_import_args(args: &[String]) -> Result<ImportArgs, String> {
    let mut import_args = ImportArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--snapshot" => {
                import_args.snapshot = Some(value_of(args, &mut i, "a file path")?);
            }
            "--quiet" => {
                import_args.quiet = true;
            }
            arg if !arg.starts_with("--") => {
                if import_args.input.is_empty() {
                    import_args.input = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if import_args.input.is_empty() {
        return Err("Missing required argument: DIRECTORY_JSON".to_string());
    }

    Ok(import_args)
}

fn parse_view_args(args: &[String]) -> Result<ViewArgs, String> {
    let mut view_args = ViewArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--state" => view_args.state = Some(value_of(args, &mut i, "a file path")?),
            "--user" => view_args.user = Some(value_of(args, &mut i, "an email")?),
            "--company" => view_args.company = Some(value_of(args, &mut i, "a company code")?),
            "--org" => view_args.org = Some(value_of(args, &mut i, "an org id")?),
            "--search" => {
                let raw = value_of(args, &mut i, "CATEGORY:TERM")?;
                view_args.search = Some(match raw.split_once(':') {
                    Some((category, term)) => (category.to_string(), term.to_string()),
                    None => ("all".to_string(), raw),
                });
            }
            "--dept" => view_args.dept = Some(value_of(args, &mut i, "a search term")?),
            "--check" => view_args.checks.push(value_of(args, &mut i, "an employee id")?),
            "--sort" => view_args.sort = value_of(args, &mut i, "a value")?,
            "--top" => {
                view_args.top = Some(
                    value_of(args, &mut i, "a value")?
                        .parse()
                        .map_err(|_| "--top must be a number".to_string())?,
                );
            }
            "--json" => {
                view_args.json = true;
            }
            arg if !arg.starts_with("--") => {
                if view_args.source.is_empty() {
                    view_args.source = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if view_args.source.is_empty() {
        return Err("Missing required argument: SNAPSHOT".to_string());
    }

    Ok(view_args)
}

fn parse_tree_args(args: &[String]) -> Result<TreeArgs, String> {
    let mut tree_args = TreeArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--state" => tree_args.state = Some(value_of(args, &mut i, "a file path")?),
            "--company" => tree_args.company = Some(value_of(args, &mut i, "a company code")?),
            "--expand" => tree_args.expand.push(value_of(args, &mut i, "an org id")?),
            "--collapse" => tree_args.collapse.push(value_of(args, &mut i, "an org id")?),
            "--dept" => tree_args.dept = Some(value_of(args, &mut i, "a search term")?),
            arg if !arg.starts_with("--") => {
                if tree_args.snapshot.is_empty() {
                    tree_args.snapshot = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if tree_args.snapshot.is_empty() {
        return Err("Missing required argument: SNAPSHOT".to_string());
    }

    Ok(tree_args)
}

fn parse_link_args(args: &[String]) -> Result<LinkArgs, String> {
    let Some((kind, emails)) = args.split_first() else {
        return Err("Missing required argument: KIND".to_string());
    };
    if let Some(option) = emails.iter().find(|arg| arg.starts_with("--")) {
        return Err(format!("Unknown option: {option}"));
    }
    if emails.is_empty() {
        return Err("Missing required argument: EMAIL".to_string());
    }

    Ok(LinkArgs {
        kind: kind.clone(),
        emails: emails.to_vec(),
    })
}
