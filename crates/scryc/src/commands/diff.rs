//! `diff`: where the statements of one parsed version went in another.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use scry_tree::{Labeler, MatcherConfig, NodeKind, SyntaxNode, Tree, VersionMapper};

use super::{option_value, CommandError};

/// Split `args` into a matcher configuration and positional arguments.
///
/// `--strict` and `--fast` pick a preset; `--min-dice=`, `--min-height=`
/// and `--max-recovery-size=` override single fields, whatever their order.
pub fn parse_matcher_options(args: &[String]) -> Result<(MatcherConfig, Vec<&str>), CommandError> {
    let mut config = MatcherConfig::default();
    let mut overrides = Vec::new();
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--strict" => config = MatcherConfig::strict(),
            "--fast" => config = MatcherConfig::fast(),
            flag if flag.starts_with("--") => overrides.push(flag),
            value => positional.push(value),
        }
    }
    for flag in overrides {
        if let Some(value) = flag.strip_prefix("--min-dice=") {
            config.min_dice = option_value("--min-dice", value)?;
            if !(0.0..=1.0).contains(&config.min_dice) {
                return Err(CommandError::InvalidOption {
                    flag: "--min-dice",
                    value: value.to_owned(),
                });
            }
        } else if let Some(value) = flag.strip_prefix("--min-height=") {
            config.min_height = option_value("--min-height", value)?;
        } else if let Some(value) = flag.strip_prefix("--max-recovery-size=") {
            config.max_recovery_size = option_value("--max-recovery-size", value)?;
        } else {
            return Err(CommandError::UnknownOption(flag.to_owned()));
        }
    }
    Ok((config, positional))
}

fn build_tree(estree_json: &str) -> Result<Tree, CommandError> {
    let value: serde_json::Value = serde_json::from_str(estree_json)?;
    let syntax = SyntaxNode::from_estree(&value)?;
    Ok(Tree::build(&syntax, &Labeler::plain()))
}

/// Match two ESTree documents and list every statement of the old one with
/// its new offset, or `-` when it has none.
pub fn diff_trees(old_json: &str, new_json: &str, config: &MatcherConfig) -> Result<String, CommandError> {
    let old = build_tree(old_json)?;
    let new = build_tree(new_json)?;
    let mapper = VersionMapper::diff(&old, &new, config);

    // outermost statement per offset
    let mut statements: BTreeMap<u32, NodeKind> = BTreeMap::new();
    for id in old.pre_order().skip(1) {
        let kind = old.kind(id);
        if kind.is_statement() {
            statements.entry(old.span(id).start).or_insert(kind);
        }
    }

    let mut out = String::new();
    let mut mapped = 0;
    for (&position, kind) in &statements {
        let target = match mapper.map_position(position) {
            Some(new_position) => {
                mapped += 1;
                new_position.to_string()
            }
            None => "-".to_owned(),
        };
        let _ = writeln!(out, "{position} {} -> {target}", kind.as_str());
    }
    let _ = writeln!(out, "{mapped} of {} statements mapped", statements.len());
    Ok(out)
}
