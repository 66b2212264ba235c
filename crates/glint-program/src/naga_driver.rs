//! Offline validation driver
//!
//! Compiles GLSL with naga's GLSL front end and validator instead of a GPU
//! driver, so shaders can be checked without a GL context. Linking checks the
//! stage set and entry points, then reflects uniform names.
//!
//! naga accepts Vulkan-flavoured GLSL 440/450/460. Shaders written for older
//! desktop GL versions (loose non-opaque uniforms, `#version 330`) are
//! reported as compile failures even if a GL driver would take them.

use std::collections::{BTreeSet, HashMap};
use std::ffi::CStr;

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::driver::{ShaderDriver, ShaderStage};
use crate::uniforms::{struct_field_name, UniformValue};

/// Uniform slot within one validated program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NagaLocation {
    program: u32,
    index: usize,
}

#[derive(Debug)]
struct NagaStage {
    kind: ShaderStage,
    module: Option<naga::Module>,
}

#[derive(Debug, Default)]
struct NagaProgram {
    attached: Vec<u32>,
    linked: bool,
    uniforms: Vec<String>,
    values: HashMap<usize, UniformValue>,
}

/// Driver that validates shaders on the CPU with naga
#[derive(Debug, Default)]
pub struct NagaDriver {
    next_id: u32,
    stages: HashMap<u32, NagaStage>,
    programs: HashMap<u32, NagaProgram>,
    current: Option<u32>,
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
        ShaderStage::Compute => naga::ShaderStage::Compute,
    }
}

/// Parse and validate one stage, returning naga's diagnostics on failure
fn compile_module(stage: ShaderStage, source: &str) -> Result<naga::Module, String> {
    let mut frontend = glsl::Frontend::default();
    let options = glsl::Options::from(naga_stage(stage));
    let module = frontend
        .parse(&options, source)
        .map_err(|errors| errors.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| error.emit_to_string(source))?;

    Ok(module)
}

/// Names a GL implementation would accept for the module's uniforms
fn reflect_uniforms(module: &naga::Module, names: &mut Vec<String>) {
    for (_, var) in module.global_variables.iter() {
        if !matches!(
            var.space,
            naga::AddressSpace::Uniform | naga::AddressSpace::Handle
        ) {
            continue;
        }

        if let Some(name) = &var.name {
            names.push(name.clone());
        }

        let ty = &module.types[var.ty];
        let naga::TypeInner::Struct { members, .. } = &ty.inner else {
            continue;
        };
        for field in members.iter().filter_map(|m| m.name.as_deref()) {
            match &var.name {
                Some(instance) => names.push(struct_field_name(instance, field)),
                None => names.push(field.to_string()),
            }
            if let Some(block) = &ty.name {
                names.push(struct_field_name(block, field));
            }
        }
    }
}

impl NagaDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform names reflected when `program` was linked
    pub fn uniform_names(&self, program: u32) -> &[String] {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.as_slice())
            .unwrap_or(&[])
    }

    /// Last value written to `name` on `program`
    pub fn uniform_value(&self, program: u32, name: &str) -> Option<UniformValue> {
        let program = self.programs.get(&program)?;
        let index = program.uniforms.iter().position(|n| n == name)?;
        program.values.get(&index).copied()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.current
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn check_stage_set(&self, attached: &[u32]) -> Result<Vec<&NagaStage>, String> {
        let mut stages = Vec::with_capacity(attached.len());
        for id in attached {
            let stage = self
                .stages
                .get(id)
                .ok_or_else(|| format!("error: attached shader {id} was deleted before linking"))?;
            if stage.module.is_none() {
                return Err(format!("error: {} shader {id} was not compiled", stage.kind));
            }
            stages.push(stage);
        }

        let kinds: BTreeSet<_> = stages.iter().map(|s| s.kind.name()).collect();
        if kinds.len() != stages.len() {
            return Err("error: more than one shader of the same stage attached".to_string());
        }

        let graphics = stages.len() == 2
            && kinds.contains(ShaderStage::Vertex.name())
            && kinds.contains(ShaderStage::Fragment.name());
        let compute = stages.len() == 1 && kinds.contains(ShaderStage::Compute.name());
        if !graphics && !compute {
            return Err(format!(
                "error: unsupported stage combination [{}]",
                kinds.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }

        Ok(stages)
    }
}

impl ShaderDriver for NagaDriver {
    type Stage = u32;
    type Program = u32;
    type Location = NagaLocation;

    fn create_stage(&mut self, stage: ShaderStage) -> Option<u32> {
        let id = self.next_id();
        self.stages.insert(
            id,
            NagaStage {
                kind: stage,
                module: None,
            },
        );
        Some(id)
    }

    fn compile_stage(&mut self, stage: u32, source: &CStr) -> Result<(), String> {
        let entry = self
            .stages
            .get_mut(&stage)
            .ok_or_else(|| format!("error: shader {stage} does not exist"))?;
        let text = source
            .to_str()
            .map_err(|e| format!("error: shader source is not valid UTF-8: {e}"))?;

        let module = compile_module(entry.kind, text)?;
        log::debug!(
            "Validated {} shader {}: {} global(s), {} function(s)",
            entry.kind,
            stage,
            module.global_variables.len(),
            module.functions.len()
        );
        entry.module = Some(module);
        Ok(())
    }

    fn delete_stage(&mut self, stage: u32) {
        self.stages.remove(&stage);
    }

    fn create_program(&mut self) -> Option<u32> {
        let id = self.next_id();
        self.programs.insert(id, NagaProgram::default());
        Some(id)
    }

    fn attach_stage(&mut self, program: u32, stage: u32) {
        if let Some(p) = self.programs.get_mut(&program) {
            p.attached.push(stage);
        }
    }

    fn link_program(&mut self, program: u32) -> Result<(), String> {
        let attached = self
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .ok_or_else(|| format!("error: program {program} does not exist"))?;

        let stages = self.check_stage_set(&attached)?;

        let mut uniforms = Vec::new();
        for stage in stages {
            let Some(module) = &stage.module else {
                continue;
            };
            let expected = naga_stage(stage.kind);
            if !module.entry_points.iter().any(|ep| ep.stage == expected) {
                return Err(format!("error: {} shader has no entry point", stage.kind));
            }
            reflect_uniforms(module, &mut uniforms);
        }
        uniforms.sort();
        uniforms.dedup();

        if let Some(p) = self.programs.get_mut(&program) {
            p.uniforms = uniforms;
            p.values.clear();
            p.linked = true;
        }
        Ok(())
    }

    fn delete_program(&mut self, program: u32) {
        self.programs.remove(&program);
        if self.current == Some(program) {
            self.current = None;
        }
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.current = program;
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<NagaLocation> {
        let p = self.programs.get(&program).filter(|p| p.linked)?;
        let index = p.uniforms.iter().position(|n| n == name)?;
        Some(NagaLocation { program, index })
    }

    fn write_uniform(&mut self, location: Option<&NagaLocation>, value: &UniformValue) {
        let Some(location) = location else {
            return;
        };
        match self.programs.get_mut(&location.program) {
            Some(p) => {
                p.values.insert(location.index, *value);
            }
            None => log::trace!("Dropping uniform write to deleted program {}", location.program),
        }
    }

    fn raw_program_id(program: u32) -> u32 {
        program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &CStr = c"#version 450
layout(location = 0) in vec3 a_position;
void main() {
    gl_Position = vec4(a_position, 1.0);
}
";

    const FRAGMENT: &CStr = c"#version 450
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(1.0, 0.0, 1.0, 1.0);
}
";

    const COMPUTE: &CStr = c"#version 450
layout(local_size_x = 1) in;
void main() {
}
";

    fn compiled(driver: &mut NagaDriver, stage: ShaderStage, source: &CStr) -> u32 {
        let id = driver.create_stage(stage).unwrap();
        driver.compile_stage(id, source).unwrap();
        id
    }

    #[test]
    fn test_compile_valid_vertex() {
        let mut driver = NagaDriver::new();
        let id = driver.create_stage(ShaderStage::Vertex).unwrap();
        assert!(driver.compile_stage(id, VERTEX).is_ok());
    }

    #[test]
    fn test_compile_syntax_error() {
        let mut driver = NagaDriver::new();
        let id = driver.create_stage(ShaderStage::Fragment).unwrap();
        let result = driver.compile_stage(id, c"#version 450\nvoid main() { this is not glsl }\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_link_graphics() {
        let mut driver = NagaDriver::new();
        let vs = compiled(&mut driver, ShaderStage::Vertex, VERTEX);
        let fs = compiled(&mut driver, ShaderStage::Fragment, FRAGMENT);
        let program = driver.create_program().unwrap();
        driver.attach_stage(program, vs);
        driver.attach_stage(program, fs);
        assert!(driver.link_program(program).is_ok());
    }

    #[test]
    fn test_link_compute() {
        let mut driver = NagaDriver::new();
        let cs = compiled(&mut driver, ShaderStage::Compute, COMPUTE);
        let program = driver.create_program().unwrap();
        driver.attach_stage(program, cs);
        assert!(driver.link_program(program).is_ok());
    }

    #[test]
    fn test_uniform_block_reflection() {
        let lit_fragment = c"#version 450
layout(set = 0, binding = 0) uniform Light {
    vec3 color;
    float intensity;
} light;
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(light.color * light.intensity, 1.0);
}
";
        let mut driver = NagaDriver::new();
        let vs = compiled(&mut driver, ShaderStage::Vertex, VERTEX);
        let fs = compiled(&mut driver, ShaderStage::Fragment, lit_fragment);
        let program = driver.create_program().unwrap();
        driver.attach_stage(program, vs);
        driver.attach_stage(program, fs);
        driver.link_program(program).unwrap();

        let names = driver.uniform_names(program).to_vec();
        let color = names
            .iter()
            .find(|n| n.ends_with(".color"))
            .expect("block member should be reflected")
            .clone();

        let location = driver.uniform_location(program, &color);
        assert!(location.is_some());
        driver.write_uniform(location.as_ref(), &UniformValue::Vec3([1.0, 0.5, 0.0]));
        assert_eq!(
            driver.uniform_value(program, &color),
            Some(UniformValue::Vec3([1.0, 0.5, 0.0]))
        );
    }

    #[test]
    fn test_link_rejects_vertex_only() {
        let mut driver = NagaDriver::new();
        let vs = compiled(&mut driver, ShaderStage::Vertex, VERTEX);
        let program = driver.create_program().unwrap();
        driver.attach_stage(program, vs);

        let err = driver.link_program(program).unwrap_err();
        assert!(err.contains("unsupported stage combination"));
    }

    #[test]
    fn test_link_rejects_uncompiled_stage() {
        let mut driver = NagaDriver::new();
        let cs = driver.create_stage(ShaderStage::Compute).unwrap();
        let program = driver.create_program().unwrap();
        driver.attach_stage(program, cs);
        assert!(driver.link_program(program).unwrap_err().contains("not compiled"));
    }

    #[test]
    fn test_unknown_uniform_resolves_to_none() {
        let mut driver = NagaDriver::new();
        let cs = compiled(&mut driver, ShaderStage::Compute, COMPUTE);
        let program = driver.create_program().unwrap();
        driver.attach_stage(program, cs);
        driver.link_program(program).unwrap();

        assert!(driver.uniform_location(program, "u_missing").is_none());
        driver.write_uniform(None, &UniformValue::Float(1.0));
        assert_eq!(driver.uniform_value(program, "u_missing"), None);
    }

    #[test]
    fn test_use_and_delete_program() {
        let mut driver = NagaDriver::new();
        let program = driver.create_program().unwrap();
        driver.use_program(Some(program));
        assert_eq!(driver.current_program(), Some(program));
        driver.delete_program(program);
        assert_eq!(driver.current_program(), None);
        assert!(driver.uniform_names(program).is_empty());
    }
}
