//! Formatted output helpers for CLI commands.
//!
//! Renders build plans, diagnostics, and rule tables as plain text.
//! Every helper returns a `String` so commands decide where it goes.

use std::fmt::Write as _;

use hdlplan_manifest::descriptor::{ActionRule, Clause, Descriptor, ModuleRef};
use hdlplan_manifest::parser::ast::BuildSettings;
use hdlplan_manifest::{Diagnostic, RawContext};

use crate::commands::plan::Resolved;

const RULE_WIDTH: usize = 60;

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "\u{2550}".repeat(RULE_WIDTH));
}

fn context_line(ctx: &RawContext) -> String {
    let mut line = format!(
        "platform: {}  device: {}  action: {}",
        ctx.platform, ctx.device, ctx.action
    );
    if let Some(backend) = &ctx.sim_backend {
        let _ = write!(line, "  backend: {backend}");
    }
    if !ctx.variants.is_empty() {
        let _ = write!(line, "  variants: {}", ctx.variants.join(", "));
    }
    line
}

/// Renders a resolved plan: context, files in compile order, then modules.
#[must_use]
pub fn render_plan(resolved: &Resolved) -> String {
    let plan = &resolved.plan;
    let mut out = String::new();
    heading(&mut out, &format!("Build plan for: {}", resolved.root));
    let _ = writeln!(out, "  {}", context_line(&resolved.context.snapshot()));
    if let Some(build) = &resolved.build {
        if let Some(top) = &build.top_module {
            let _ = writeln!(out, "  top module: {top}");
        }
        if let Some(top) = &build.sim_top {
            let _ = writeln!(out, "  simulation top: {top}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Files ({}):", plan.files().len());
    for file in plan.files() {
        let _ = writeln!(out, "    {file}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Modules ({}):", plan.modules().len());
    for module in plan.modules() {
        let _ = writeln!(out, "    {:<28} {}", module.name, module.key);
    }

    if let Some(cmd) = resolved.build.as_ref().and_then(|b| b.post_cmd.as_ref()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Post command: {cmd}");
    }
    out
}

/// Renders a diagnostic with its attribution and the context it ran against.
#[must_use]
pub fn render_diagnostic(diag: &Diagnostic) -> String {
    let mut out = diag.message.clone();
    if let Some(module) = &diag.module {
        let _ = write!(out, "\n  module:  {module}");
    }
    if !diag.path.is_empty() {
        let _ = write!(out, "\n  path:    {}", diag.path.join(" -> "));
    }
    let _ = write!(out, "\n  context: {}", context_line(&diag.context));
    out
}

/// Renders the context defaults and tool metadata of a `BUILD` block.
#[must_use]
pub fn render_build_settings(build: &BuildSettings) -> String {
    let fields = [
        ("action", build.action.as_deref()),
        ("sim_backend", build.sim_backend.as_deref()),
        ("platform", build.platform.as_deref()),
        ("device", build.device.as_deref()),
        ("top_module", build.top_module.as_deref()),
        ("sim_top", build.sim_top.as_deref()),
        ("post_cmd", build.post_cmd.as_deref()),
    ];
    let mut out = String::from("  BUILD\n");
    for (key, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "    {key} = {value}");
        }
    }
    if !build.variants.is_empty() {
        let _ = writeln!(out, "    variants = {}", build.variants.join(", "));
    }
    out
}

fn module_ref(module: &ModuleRef) -> String {
    match module {
        ModuleRef::Local(path) => path.clone(),
        ModuleRef::External(path) => format!("{}{path}", hdlplan_common::constants::EXTERNAL_SCOPE_PREFIX),
    }
}

fn write_clause(out: &mut String, clause: &Clause, indent: usize) {
    let pad = " ".repeat(indent);
    if !clause.files.is_empty() {
        let _ = writeln!(out, "{pad}files: {}", clause.files.join(", "));
    }
    if !clause.modules.is_empty() {
        let modules: Vec<String> = clause.modules.iter().map(module_ref).collect();
        let _ = writeln!(out, "{pad}modules: {}", modules.join(", "));
    }
}

fn write_actions(out: &mut String, actions: &[ActionRule], indent: usize) {
    let pad = " ".repeat(indent);
    for rule in actions {
        let _ = writeln!(out, "{pad}ACTION {}", rule.action);
        write_clause(out, &rule.clause, indent + 2);
        for backend in &rule.backends {
            let _ = writeln!(out, "{pad}  BACKEND {}", backend.backend);
            write_clause(out, &backend.clause, indent + 4);
        }
    }
}

/// Renders every rule of a descriptor in declaration order.
#[must_use]
pub fn render_rules(desc: &Descriptor) -> String {
    let mut out = String::new();
    if desc.base.is_empty() {
        let _ = writeln!(out, "  (no unconditional files or modules)");
    }
    write_clause(&mut out, &desc.base, 2);

    for rule in &desc.devices {
        let _ = writeln!(out, "  DEVICE {} {}", rule.platform, rule.class);
        write_clause(&mut out, &rule.clause, 4);
        write_actions(&mut out, &rule.actions, 4);
    }
    write_actions(&mut out, &desc.actions, 2);

    if let Some(variants) = &desc.variants {
        let _ = writeln!(out, "  VARIANTS");
        for variant in variants {
            let _ = writeln!(out, "    {} = {}", variant.name, variant.file);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use hdlplan_common::types::ScopedPath;
    use hdlplan_manifest::descriptor::DeviceRule;
    use hdlplan_manifest::parser::parse_manifest;
    use hdlplan_manifest::{Context, DescriptorSet, DiagnosticKind, Resolver};

    use super::*;

    fn resolved(build: Option<BuildSettings>) -> Resolved {
        let set = DescriptorSet::new()
            .with(
                "rtl",
                Descriptor::new("rtl")
                    .module(ModuleRef::Local("fofb_cc_pkg".into()))
                    .device(DeviceRule::prefix("xilinx", "XC6V").files(["gtx.vhd"])),
            )
            .with(
                "rtl/fofb_cc_pkg",
                Descriptor::new("fofb_cc_pkg").files(["fofb_cc_pkg.vhd"]),
            );
        let context =
            Context::validate(&RawContext::synthesis("xilinx", "xc6vlx240t")).expect("valid context");
        let root = ScopedPath::local("rtl");
        let plan = Resolver::new(&set)
            .resolve(std::slice::from_ref(&root), &context)
            .expect("should resolve");
        Resolved {
            root,
            build,
            context,
            plan,
        }
    }

    #[test]
    fn plan_lists_files_then_modules() {
        let text = render_plan(&resolved(None));
        assert!(text.starts_with("Build plan for: rtl\n"), "got: {text}");
        assert!(text.contains("platform: xilinx  device: xc6vlx240t  action: synthesis"));
        assert!(text.contains("Files (2):\n    rtl/gtx.vhd\n    rtl/fofb_cc_pkg/fofb_cc_pkg.vhd\n"));
        assert!(text.contains("Modules (2):"));
        assert!(!text.contains("Post command"));
    }

    #[test]
    fn plan_shows_build_metadata() {
        let build = BuildSettings {
            top_module: Some("fofb_cc_top".into()),
            post_cmd: Some("vsim -do run.do".into()),
            ..BuildSettings::default()
        };
        let text = render_plan(&resolved(Some(build)));
        assert!(text.contains("top module: fofb_cc_top"));
        assert!(text.contains("Post command: vsim -do run.do"));
    }

    #[test]
    fn diagnostic_shows_module_path_and_context() {
        let diag = Diagnostic::new(
            DiagnosticKind::UnsupportedTargetDevice {
                platform: "xilinx".into(),
                device: "xc7a200t".into(),
            },
            RawContext::synthesis("xilinx", "xc7a200t"),
        )
        .in_module(Some("rtl".into()), vec![".".into(), "rtl".into()]);

        let text = render_diagnostic(&diag);
        assert!(text.starts_with("rtl: target/device not supported: xilinx/xc7a200t"), "got: {text}");
        assert!(text.contains("module:  rtl"));
        assert!(text.contains("path:    . -> rtl"));
        assert!(text.contains("context: platform: xilinx  device: xc7a200t"));
    }

    #[test]
    fn unattributed_diagnostic_has_no_module_line() {
        let diag = Diagnostic::new(
            DiagnosticKind::MissingSimBackend,
            RawContext {
                action: "simulation".into(),
                ..RawContext::default()
            },
        );
        let text = render_diagnostic(&diag);
        assert!(!text.contains("module:"));
        assert!(!text.contains("path:"));
    }

    #[test]
    fn rules_list_every_table() {
        let file = parse_manifest(
            r#"MODULE gtx {
    DEVICE xilinx PREFIX "XC6V" {
        files = ["gtx_if.vhd"]
        ACTION simulation { BACKEND modelsim { files = ["gtx_msim.vhd"] } }
    }
    external = ["general-cores/common"]
    VARIANTS { bpm_wrapper = "bpm.vhd" }
}"#,
        )
        .expect("should parse");

        let text = render_rules(&file.descriptor);
        assert!(text.contains("  modules: ext:general-cores/common\n"), "got: {text}");
        assert!(text.contains("  DEVICE xilinx XC6V*\n    files: gtx_if.vhd\n"));
        assert!(text.contains("    ACTION simulation\n      BACKEND modelsim\n        files: gtx_msim.vhd\n"));
        assert!(text.contains("  VARIANTS\n    bpm_wrapper = bpm.vhd\n"));
        assert!(!text.contains("no unconditional"));
    }

    #[test]
    fn rules_note_empty_base() {
        let text = render_rules(&Descriptor::new("clk_if"));
        assert!(text.contains("(no unconditional files or modules)"));
    }

    #[test]
    fn build_settings_skip_unset_fields() {
        let build = BuildSettings {
            action: Some("simulation".into()),
            device: Some("xc7a200t".into()),
            ..BuildSettings::default()
        };
        let text = render_build_settings(&build);
        assert_eq!(text, "  BUILD\n    action = simulation\n    device = xc7a200t\n");
    }
}
