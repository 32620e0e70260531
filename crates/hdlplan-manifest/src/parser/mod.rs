//! `.hdm` manifest parser built on `nom`.
//!
//! Transforms raw manifest text into a validated [`ManifestFile`] through
//! lexing, parsing, and static analysis phases.

pub mod ast;
pub mod lexer;
pub mod validator;

use hdlplan_common::error::{HdlplanError, Result};
use hdlplan_common::types::Action;

use self::ast::{BuildSettings, ManifestFile};
use self::lexer::Token;
use crate::descriptor::{
    ActionRule, BackendRule, Clause, Descriptor, DeviceRule, ModuleRef, Variant,
};

/// Cursor into a token stream for recursive-descent parsing.
struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s.clone()),
            other => Err(parse_err(format!("expected identifier, got {other:?}"))),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            other => Err(parse_err(format!("expected {expected:?}, got {other:?}"))),
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::StringLiteral(s)) => Ok(s.clone()),
            other => Err(parse_err(format!("expected string literal, got {other:?}"))),
        }
    }

    /// Accepts either a bare identifier or a string literal.
    fn expect_name(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Identifier(s) | Token::StringLiteral(s)) => Ok(s.clone()),
            other => Err(parse_err(format!(
                "expected identifier or string, got {other:?}"
            ))),
        }
    }

    /// Consumes a closing brace if next; errors on end of input.
    fn close_block(&mut self, block: &str) -> Result<bool> {
        match self.peek() {
            Some(Token::BraceClose) => {
                let _ = self.advance();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(parse_err(format!(
                "unexpected end of input inside {block} block"
            ))),
        }
    }
}

fn parse_err(message: String) -> HdlplanError {
    HdlplanError::manifest(message)
}

fn skip_optional_comma(cursor: &mut TokenCursor<'_>) {
    if cursor.peek() == Some(&Token::Comma) {
        let _ = cursor.advance();
    }
}

/// Parses a manifest from its source text and validates the module block.
///
/// # Errors
///
/// Returns an error if the input contains syntax errors or fails validation.
pub fn parse_manifest(input: &str) -> Result<ManifestFile> {
    tracing::debug!("parsing manifest input");
    let tokens = lexer::tokenize(input)?;
    let mut cursor = TokenCursor::new(&tokens);
    let file = parse_file(&mut cursor)?;
    validator::validate(&file.descriptor)?;
    Ok(file)
}

fn parse_file(cursor: &mut TokenCursor<'_>) -> Result<ManifestFile> {
    let mut build = None;
    let mut descriptor = None;

    while let Some(tok) = cursor.peek() {
        match tok {
            Token::Build => {
                if build.is_some() {
                    return Err(parse_err("duplicate BUILD block".into()));
                }
                build = Some(parse_build(cursor)?);
            }
            Token::Module => {
                if descriptor.is_some() {
                    return Err(parse_err(
                        "a manifest declares exactly one MODULE block".into(),
                    ));
                }
                descriptor = Some(parse_module(cursor)?);
            }
            other => {
                return Err(parse_err(format!(
                    "expected BUILD or MODULE at top level, got {other:?}"
                )));
            }
        }
    }

    let descriptor = descriptor.ok_or_else(|| parse_err("missing MODULE block".into()))?;
    Ok(ManifestFile { build, descriptor })
}

fn parse_build(cursor: &mut TokenCursor<'_>) -> Result<BuildSettings> {
    cursor.expect_token(&Token::Build)?;
    cursor.expect_token(&Token::BraceOpen)?;

    let mut settings = BuildSettings::default();
    while !cursor.close_block("BUILD")? {
        let key = cursor.expect_identifier()?;
        cursor.expect_token(&Token::Equals)?;
        match key.as_str() {
            "action" => settings.action = Some(cursor.expect_string()?),
            "sim_backend" | "sim_tool" => settings.sim_backend = Some(cursor.expect_string()?),
            "platform" | "target" => settings.platform = Some(cursor.expect_string()?),
            "device" | "syn_device" => settings.device = Some(cursor.expect_string()?),
            "variants" | "comms_cc_wrapper" => settings.variants = parse_string_list(cursor)?,
            "top_module" => settings.top_module = Some(cursor.expect_string()?),
            "sim_top" => settings.sim_top = Some(cursor.expect_string()?),
            "post_cmd" | "sim_post_cmd" => settings.post_cmd = Some(cursor.expect_string()?),
            _ => return Err(parse_err(format!("unknown BUILD property: {key}"))),
        }
        skip_optional_comma(cursor);
    }
    Ok(settings)
}

fn parse_module(cursor: &mut TokenCursor<'_>) -> Result<Descriptor> {
    cursor.expect_token(&Token::Module)?;
    let name = cursor.expect_identifier()?;
    cursor.expect_token(&Token::BraceOpen)?;

    let mut desc = Descriptor::new(name);
    while !cursor.close_block("MODULE")? {
        match cursor.peek() {
            Some(Token::Device) => desc.devices.push(parse_device(cursor)?),
            Some(Token::Action) => desc.actions.push(parse_action(cursor)?),
            Some(Token::Variants) => {
                if desc.variants.is_some() {
                    return Err(parse_err(format!(
                        "duplicate VARIANTS block in module {}",
                        desc.name
                    )));
                }
                desc.variants = Some(parse_variants(cursor)?);
            }
            _ => parse_clause_property(cursor, &mut desc.base, "MODULE")?,
        }
    }
    Ok(desc)
}

fn parse_device(cursor: &mut TokenCursor<'_>) -> Result<DeviceRule> {
    cursor.expect_token(&Token::Device)?;
    let platform = cursor.expect_name()?;
    let mut rule = match cursor.peek() {
        Some(Token::Prefix) => {
            let _ = cursor.advance();
            DeviceRule::prefix(platform, cursor.expect_string()?)
        }
        Some(Token::Exact) => {
            let _ = cursor.advance();
            DeviceRule::exact(platform, cursor.expect_string()?)
        }
        _ => DeviceRule::any(platform),
    };
    cursor.expect_token(&Token::BraceOpen)?;

    while !cursor.close_block("DEVICE")? {
        if cursor.peek() == Some(&Token::Action) {
            rule.actions.push(parse_action(cursor)?);
        } else {
            parse_clause_property(cursor, &mut rule.clause, "DEVICE")?;
        }
    }
    Ok(rule)
}

fn parse_action(cursor: &mut TokenCursor<'_>) -> Result<ActionRule> {
    cursor.expect_token(&Token::Action)?;
    let word = cursor.expect_identifier()?;
    let action: Action = word
        .parse()
        .map_err(|_| parse_err(format!("unknown action in ACTION block: {word}")))?;
    cursor.expect_token(&Token::BraceOpen)?;

    let mut rule = ActionRule::new(action);
    while !cursor.close_block("ACTION")? {
        if cursor.peek() == Some(&Token::Backend) {
            rule.backends.push(parse_backend(cursor)?);
        } else {
            parse_clause_property(cursor, &mut rule.clause, "ACTION")?;
        }
    }
    Ok(rule)
}

fn parse_backend(cursor: &mut TokenCursor<'_>) -> Result<BackendRule> {
    cursor.expect_token(&Token::Backend)?;
    let backend = cursor.expect_name()?;
    cursor.expect_token(&Token::BraceOpen)?;

    let mut clause = Clause::default();
    while !cursor.close_block("BACKEND")? {
        parse_clause_property(cursor, &mut clause, "BACKEND")?;
    }
    Ok(BackendRule { backend, clause })
}

fn parse_variants(cursor: &mut TokenCursor<'_>) -> Result<Vec<Variant>> {
    cursor.expect_token(&Token::Variants)?;
    cursor.expect_token(&Token::BraceOpen)?;

    let mut variants = Vec::new();
    while !cursor.close_block("VARIANTS")? {
        let name = cursor.expect_identifier()?;
        cursor.expect_token(&Token::Equals)?;
        let file = cursor.expect_string()?;
        variants.push(Variant { name, file });
        skip_optional_comma(cursor);
    }
    Ok(variants)
}

/// Parses one `files`, `modules` or `external` property into `clause`.
/// Repeated properties accumulate.
fn parse_clause_property(
    cursor: &mut TokenCursor<'_>,
    clause: &mut Clause,
    block: &str,
) -> Result<()> {
    let key = match cursor.advance() {
        Some(Token::Identifier(s)) => s.clone(),
        other => {
            return Err(parse_err(format!(
                "unexpected {other:?} in {block} block"
            )));
        }
    };
    cursor.expect_token(&Token::Equals)?;

    match key.as_str() {
        "files" => clause.files.extend(parse_string_list(cursor)?),
        "modules" => clause
            .modules
            .extend(parse_string_list(cursor)?.into_iter().map(ModuleRef::Local)),
        "external" => clause
            .modules
            .extend(parse_string_list(cursor)?.into_iter().map(ModuleRef::External)),
        _ => {
            return Err(parse_err(format!("unknown {block} property: {key}")));
        }
    }
    skip_optional_comma(cursor);
    Ok(())
}

fn parse_string_list(cursor: &mut TokenCursor<'_>) -> Result<Vec<String>> {
    cursor.expect_token(&Token::BracketOpen)?;
    let mut items = Vec::new();

    while cursor.peek() != Some(&Token::BracketClose) {
        if cursor.peek().is_none() {
            return Err(parse_err("unexpected end of input inside list".into()));
        }
        items.push(cursor.expect_string()?);
        skip_optional_comma(cursor);
    }

    cursor.expect_token(&Token::BracketClose)?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DeviceClass;

    #[test]
    fn parse_minimal_module() {
        let file = parse_manifest("MODULE fofb_cc_pkg { files = [\"rtl/vhdl/fofb_cc_pkg.vhd\"] }")
            .expect("should parse");
        assert!(file.build.is_none());
        assert_eq!(file.descriptor.name, "fofb_cc_pkg");
        assert_eq!(file.descriptor.base.files, ["rtl/vhdl/fofb_cc_pkg.vhd"]);
    }

    #[test]
    fn parse_device_rules_in_order() {
        let input = r#"MODULE fofb_cc_rx_fifo {
    files = ["rtl/vhdl/fofb_cc_rx_buffer.vhd"]
    DEVICE xilinx PREFIX "XC6V" { files = ["coregen/virtex6/fofb_cc_rx_fifo.vhd"] }
    DEVICE xilinx PREFIX "XC5V" { files = ["coregen/virtex5/fofb_cc_rx_fifo.vhd"] }
    DEVICE "xilinx" EXACT "xc7a200t" { files = ["coregen/artix7/fofb_cc_rx_fifo.vhd"] }
}"#;
        let file = parse_manifest(input).expect("should parse");
        let devices = &file.descriptor.devices;
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].class, DeviceClass::Prefix("XC6V".into()));
        assert_eq!(devices[1].clause.files, ["coregen/virtex5/fofb_cc_rx_fifo.vhd"]);
        assert_eq!(devices[2].platform, "xilinx");
        assert_eq!(devices[2].class, DeviceClass::Exact("xc7a200t".into()));
    }

    #[test]
    fn parse_any_device_rule() {
        let file = parse_manifest(
            r#"MODULE fofb_cc_fa_if { DEVICE xilinx { files = ["rtl/vhdl/fofb_cc_fa_if_bram.vhd"] } }"#,
        )
        .expect("should parse");
        assert_eq!(file.descriptor.devices[0].class, DeviceClass::Any);
    }

    #[test]
    fn parse_module_references() {
        let input = r#"MODULE rtl {
    modules = ["fofb_cc_arbmux", "fofb_cc_pkg",]
    external = ["general-cores/modules/common"]
    DEVICE xilinx PREFIX "XC6V" { modules = ["fofb_cc_gtx_if"] }
}"#;
        let file = parse_manifest(input).expect("should parse");
        assert_eq!(
            file.descriptor.base.modules,
            [
                ModuleRef::Local("fofb_cc_arbmux".into()),
                ModuleRef::Local("fofb_cc_pkg".into()),
                ModuleRef::External("general-cores/modules/common".into()),
            ]
        );
        assert_eq!(
            file.descriptor.devices[0].clause.modules,
            [ModuleRef::Local("fofb_cc_gtx_if".into())]
        );
    }

    #[test]
    fn parse_nested_action_and_backend() {
        let input = r#"MODULE gtx {
    DEVICE xilinx PREFIX "XC6V" {
        files = ["gtx_if.vhd"]
        ACTION synthesis { files = ["gtx.ngc"] }
        ACTION simulation {
            files = ["gtx_sim.vhd"]
            BACKEND modelsim { files = ["gtx_msim.vhd"] }
            BACKEND "ghdl" { }
        }
    }
    ACTION simulation { files = ["tb_helpers.vhd"] }
}"#;
        let file = parse_manifest(input).expect("should parse");
        let device = &file.descriptor.devices[0];
        assert_eq!(device.actions.len(), 2);
        assert_eq!(device.actions[1].action, Action::Simulation);
        assert_eq!(device.actions[1].backends.len(), 2);
        assert_eq!(device.actions[1].backends[0].backend, "modelsim");
        assert_eq!(device.actions[1].backends[1].backend, "ghdl");
        assert_eq!(file.descriptor.actions.len(), 1);
    }

    #[test]
    fn parse_variants_block() {
        let input = r#"MODULE fofb_cc_top {
    files = ["rtl/vhdl/fofb_cc_top.vhd"]
    VARIANTS {
        bpm_wrapper = "rtl/vhdl/fofb_cc_top_bpm_wrapper.vhd",
        sniffer_v6_wrapper = "rtl/vhdl/fofb_cc_top_sniffer_v6_wrapper.vhd"
    }
}"#;
        let file = parse_manifest(input).expect("should parse");
        let variants = file.descriptor.variants.expect("variant table");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].name, "sniffer_v6_wrapper");
    }

    #[test]
    fn parse_empty_variants_block_declares_table() {
        let file = parse_manifest("MODULE top { VARIANTS { } }").expect("should parse");
        assert_eq!(file.descriptor.variants, Some(Vec::new()));
    }

    #[test]
    fn parse_build_block() {
        let input = r#"// bench for the frame decoder
BUILD {
    action = "simulation"
    sim_tool = "modelsim"
    top_module = "fofb_cc_fod_tb"
    sim_top = "fofb_cc_fod_tb"
    target = "xilinx"
    syn_device = "xc7a200t"
    post_cmd = "vsim -do run.do"
    variants = ["bpm_wrapper"]
}
MODULE fofb_cc_fod_tb {
    modules = ["../../../rtl/fofb_cc_fod"]
    files = ["../bench/fofb_cc_fod_tb.vhd", "../bench/io_utils.vhd"]
}"#;
        let file = parse_manifest(input).expect("should parse");
        let build = file.build.expect("build block");
        assert_eq!(build.action.as_deref(), Some("simulation"));
        assert_eq!(build.sim_backend.as_deref(), Some("modelsim"));
        assert_eq!(build.platform.as_deref(), Some("xilinx"));
        assert_eq!(build.device.as_deref(), Some("xc7a200t"));
        assert_eq!(build.post_cmd.as_deref(), Some("vsim -do run.do"));

        let raw = build.context_defaults();
        assert_eq!(raw.action, "simulation");
        assert_eq!(raw.variants, ["bpm_wrapper"]);
    }

    #[test]
    fn parse_build_aliases() {
        let input = r#"BUILD {
    sim_post_cmd = "vsim -c -do run.do"
    comms_cc_wrapper = ["bpm_wrapper", "pmc_wrapper"]
}
MODULE fofb_cc_arbmux_tb { files = ["../bench/fofb_cc_arbmux_tb.vhd"] }"#;
        let build = parse_manifest(input)
            .expect("should parse")
            .build
            .expect("build block");
        assert_eq!(build.post_cmd.as_deref(), Some("vsim -c -do run.do"));
        assert_eq!(build.variants, ["bpm_wrapper", "pmc_wrapper"]);
    }

    #[test]
    fn parse_error_missing_module() {
        let err = parse_manifest("BUILD { action = \"synthesis\" }").unwrap_err();
        assert!(err.to_string().contains("missing MODULE"), "got: {err}");
    }

    #[test]
    fn parse_error_two_modules() {
        assert!(parse_manifest("MODULE a { } MODULE b { }").is_err());
    }

    #[test]
    fn parse_error_unknown_property() {
        let err = parse_manifest("MODULE a { sources = [\"x.vhd\"] }").unwrap_err();
        assert!(err.to_string().contains("unknown MODULE property: sources"), "got: {err}");
    }

    #[test]
    fn parse_error_unknown_action() {
        let err = parse_manifest("MODULE a { ACTION implementation { } }").unwrap_err();
        assert!(err.to_string().contains("implementation"), "got: {err}");
    }

    #[test]
    fn parse_error_backend_outside_action() {
        assert!(parse_manifest("MODULE a { DEVICE xilinx { BACKEND modelsim { } } }").is_err());
    }

    #[test]
    fn parse_error_missing_brace() {
        let err = parse_manifest("MODULE a {\n files = [\"a.vhd\"]\n").unwrap_err();
        assert!(err.to_string().contains("end of input"), "got: {err}");
    }

    #[test]
    fn parse_runs_validation() {
        let input = r#"MODULE a {
    DEVICE xilinx { files = ["any.vhd"] }
    DEVICE xilinx PREFIX "XC6V" { files = ["v6.vhd"] }
}"#;
        let err = parse_manifest(input).unwrap_err();
        assert!(err.to_string().contains("overlaps"), "got: {err}");
    }
}
