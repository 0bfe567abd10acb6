// build.rs
// Compiles the GLSL pipeline shaders to SPIR-V with glslc

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const SHADER_STAGES: [&str; 2] = ["vert", "frag"];

/// Output is `<name>.<stage>.spv` so vertex and fragment stages of one pipeline never collide
fn output_path(source: &Path, target_dir: &Path) -> Option<PathBuf> {
    let file_name = source.file_name()?.to_str()?;
    Some(target_dir.join(format!("{file_name}.spv")))
}

fn is_stale(source: &Path, output: &Path) -> bool {
    let modified = |path: &Path| std::fs::metadata(path).and_then(|meta| meta.modified());
    match (modified(source), modified(output)) {
        (Ok(src), Ok(dst)) => src > dst,
        _ => true,
    }
}

fn compile(glslc: &str, source: &Path, output: &Path) -> Result<(), String> {
    let status = Command::new(glslc)
        .arg(source)
        .arg("-o")
        .arg(output)
        .status()
        .map_err(|e| format!("failed to run glslc for {}: {e}", source.display()))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!(
            "glslc failed for {} with exit code {}",
            source.display(),
            status.code().unwrap_or(-1)
        ))
    }
}

fn main() {
    println!("cargo:rerun-if-changed=resources/shaders");
    println!("cargo:rerun-if-env-changed=SKIP_SHADERS");
    println!("cargo:rerun-if-env-changed=VULKAN_SDK");

    if env::var("SKIP_SHADERS").is_ok() {
        eprintln!("info: Skipping shader compilation (SKIP_SHADERS set)");
        return;
    }

    let Ok(vulkan_sdk) = env::var("VULKAN_SDK") else {
        eprintln!("warning: VULKAN_SDK not set, shader compilation skipped");
        return;
    };

    let glslc = if cfg!(target_os = "windows") {
        format!("{vulkan_sdk}\\Bin\\glslc.exe")
    } else {
        format!("{vulkan_sdk}/bin/glslc")
    };
    if !Path::new(&glslc).exists() {
        panic!("Shader compiler not found at {glslc}");
    }

    // Workspace-level target/shaders, where PipelineSetConfig looks by default
    let shader_dir = PathBuf::from("resources/shaders");
    let target_dir = PathBuf::from("../../target/shaders");
    if let Err(e) = std::fs::create_dir_all(&target_dir) {
        eprintln!("warning: Failed to create {}: {e}", target_dir.display());
        return;
    }

    let Ok(entries) = std::fs::read_dir(&shader_dir) else {
        eprintln!("info: No shader directory at {}", shader_dir.display());
        return;
    };

    let mut compiled = 0;
    for path in entries.filter_map(Result::ok).map(|entry| entry.path()) {
        let is_stage = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SHADER_STAGES.contains(&ext));
        if !is_stage {
            continue;
        }
        let Some(output) = output_path(&path, &target_dir) else {
            continue;
        };
        if !is_stale(&path, &output) {
            continue;
        }

        if let Err(message) = compile(&glslc, &path, &output) {
            panic!("Shader compilation failed: {message}");
        }
        compiled += 1;
    }

    eprintln!("info: Compiled {compiled} shader(s)");
}
