use crate::note::RecordId;
use crate::query::DerivedQuery;
use std::error::Error;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Value following -t/--tag.
    pub fn extract_tag(&mut self) -> Result<String, Box<dyn Error>> {
        match self.iter.next().map(|v| v.trim().to_string()) {
            Some(tag) if !tag.is_empty() => Ok(tag),
            Some(_) => Err(format!(
                "Invalid tag provided to {}",
                self.command_name
            )
            .into()),
            None => Err(format!(
                "Provide a tag after -t/--tag for {}",
                self.command_name
            )
            .into()),
        }
    }

    /// Extract a string value for a flag
    pub fn extract_value(
        &mut self,
        flag: &str,
    ) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    pub fn extract_query(&mut self) -> Result<DerivedQuery, Box<dyn Error>> {
        let raw = self.extract_value("-q/--query")?;
        DerivedQuery::parse(&raw)
            .ok_or_else(|| format!("Unsupported query: {raw}").into())
    }

    /// Get next positional argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }
}

/// Which notes a command should act on.
#[derive(Default, Debug)]
pub struct Selection {
    pub ids: Vec<RecordId>,
    pub tags: Vec<String>,
    pub query: Option<DerivedQuery>,
    pub all: bool,
}

impl Selection {
    /// True when only flags that narrow the whole collection were given.
    pub fn filters_collection(&self) -> bool {
        self.all || !self.tags.is_empty() || self.query.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && !self.filters_collection()
    }
}

/// Parse ids, -t/--tag, -q/--query and --all.
pub fn parse_selection(
    args: Vec<String>,
    command_name: &str,
) -> Result<Selection, Box<dyn Error>> {
    let mut parser = ArgParser::new(args, command_name);
    let mut selection = Selection::default();
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-t" | "--tag" => selection.tags.push(parser.extract_tag()?),
            "-q" | "--query" => selection.query = Some(parser.extract_query()?),
            "--all" => selection.all = true,
            other if other.starts_with('-') => {
                return Err(format!(
                    "Unknown flag for {}: {other}",
                    parser.command_name()
                )
                .into());
            }
            other => {
                let id = other.parse::<RecordId>().map_err(|_| {
                    format!("Note ids are numbers, got {other}")
                })?;
                selection.ids.push(id);
            }
        }
    }
    Ok(selection)
}

/// Split `-t <tag>` pairs from the remaining words.
pub fn split_tags(
    args: Vec<String>,
    command_name: &str,
) -> Result<(Vec<String>, Vec<String>), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, command_name);
    let mut tags = Vec::new();
    let mut rest = Vec::new();
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-t" | "--tag" => tags.push(parser.extract_tag()?),
            _ => rest.push(arg),
        }
    }
    Ok((tags, rest))
}
