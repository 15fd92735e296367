//! Tool availability checks before a build starts.

use super::error::{BuildError, Result};
use super::exec::Invocation;
use super::mach;
use super::package;
use super::strip;
use super::BuildPlan;
use tracing::{debug, warn};

/// Every external program `plan` will invoke.
pub fn required_tools(plan: &BuildPlan) -> Vec<String> {
    let mut invocations: Vec<Invocation> = Vec::new();

    if plan.clobber {
        invocations.push(super::clobber_invocation(&plan.layout));
    }
    for &arch in &plan.archs {
        invocations.push(mach::invocation(
            &plan.layout,
            plan.platform,
            &plan.toolchain,
            plan.flags,
            mach::BUILD,
        ));
        invocations.extend(strip::invocations(&plan.layout, plan.platform, arch, plan.flags));
    }
    invocations.extend(package::universal_merges(
        &plan.layout,
        plan.platform,
        &plan.archs,
        plan.flags.build_type(),
    ));

    // mach is an argument to python there, not the program
    if plan.platform.mach_via_python() {
        invocations.push(Invocation::new(plan.layout.mach(), &plan.layout.base_dir));
    }

    let mut tools: Vec<String> = Vec::new();
    for inv in invocations {
        let name = inv.program_name();
        if !tools.contains(&name) {
            tools.push(name);
        }
    }
    tools
}

/// Fail with the full list of tools that cannot be found.
pub fn check(plan: &BuildPlan) -> Result<()> {
    println!("=== Preflight checks ({}) ===", plan.platform);

    let mut missing = Vec::new();
    for tool in required_tools(plan) {
        match which::which(&tool) {
            Ok(path) => debug!("found {tool} at {}", path.display()),
            Err(_) => {
                warn!("missing tool: {tool}");
                missing.push(tool);
            }
        }
    }

    if !missing.is_empty() {
        return Err(BuildError::MissingTools(missing));
    }
    Ok(())
}
