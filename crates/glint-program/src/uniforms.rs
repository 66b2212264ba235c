//! Typed uniform setters
//!
//! Names are resolved on every call and never cached. Unknown names resolve
//! to the driver's ignore location, so the write is silently dropped.

use crate::driver::ShaderDriver;

/// A uniform value of fixed numeric shape.
///
/// Matrices are column-major: `m[column][row]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Uint(u32),
    Float(f32),
    Double(f64),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([[f32; 2]; 2]),
    Mat3([[f32; 3]; 3]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    /// GLSL type name of the value
    pub const fn glsl_type(&self) -> &'static str {
        match self {
            UniformValue::Int(_) => "int",
            UniformValue::Uint(_) => "uint",
            UniformValue::Float(_) => "float",
            UniformValue::Double(_) => "double",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::Uint(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<f64> for UniformValue {
    fn from(v: f64) -> Self {
        UniformValue::Double(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<[[f32; 2]; 2]> for UniformValue {
    fn from(m: [[f32; 2]; 2]) -> Self {
        UniformValue::Mat2(m)
    }
}

impl From<[[f32; 3]; 3]> for UniformValue {
    fn from(m: [[f32; 3]; 3]) -> Self {
        UniformValue::Mat3(m)
    }
}

impl From<[[f32; 4]; 4]> for UniformValue {
    fn from(m: [[f32; 4]; 4]) -> Self {
        UniformValue::Mat4(m)
    }
}

/// Effective uniform name of a struct member: `"<struct>.<field>"`
pub fn struct_field_name(struct_name: &str, field_name: &str) -> String {
    format!("{struct_name}.{field_name}")
}

/// Resolve `name` on `program` and write `value` to it.
///
/// With [`GlDriver`](crate::GlDriver) `program` only selects the location;
/// the write lands on the currently bound program, so call
/// [`activate`](crate::activate) first.
pub fn set_uniform<D: ShaderDriver>(
    driver: &mut D,
    program: D::Program,
    name: &str,
    value: impl Into<UniformValue>,
) {
    let value = value.into();
    let location = driver.uniform_location(program, name);
    if location.is_none() {
        log::trace!("Uniform {:?} not found on {:?}, write ignored", name, program);
    }
    driver.write_uniform(location.as_ref(), &value);
}

/// Resolve `"<struct_name>.<field_name>"` on `program` and write `value` to it
pub fn set_struct_uniform<D: ShaderDriver>(
    driver: &mut D,
    program: D::Program,
    struct_name: &str,
    field_name: &str,
    value: impl Into<UniformValue>,
) {
    set_uniform(driver, program, &struct_field_name(struct_name, field_name), value);
}

/// Uniform setters bound to one program
///
/// The same binding rule as [`set_uniform`] applies: with a GL driver the
/// program must be active.
pub struct Uniforms<'a, D: ShaderDriver> {
    driver: &'a mut D,
    program: D::Program,
}

impl<'a, D: ShaderDriver> Uniforms<'a, D> {
    pub fn new(driver: &'a mut D, program: D::Program) -> Self {
        Self { driver, program }
    }

    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> &mut Self {
        set_uniform(&mut *self.driver, self.program, name, value);
        self
    }

    pub fn set_struct(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: impl Into<UniformValue>,
    ) -> &mut Self {
        set_struct_uniform(&mut *self.driver, self.program, struct_name, field_name, value);
        self
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_uint(&mut self, name: &str, value: u32) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_double(&mut self, name: &str, value: f64) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_vec2(&mut self, name: &str, value: [f32; 2]) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_vec3(&mut self, name: &str, value: [f32; 3]) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_vec4(&mut self, name: &str, value: [f32; 4]) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_mat2(&mut self, name: &str, value: [[f32; 2]; 2]) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_mat3(&mut self, name: &str, value: [[f32; 3]; 3]) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_mat4(&mut self, name: &str, value: [[f32; 4]; 4]) -> &mut Self {
        self.set(name, value)
    }

    // Struct members, resolved as "<struct>.<field>"
    pub fn set_struct_int(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: i32,
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_uint(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: u32,
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_float(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: f32,
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_double(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: f64,
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_vec2(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: [f32; 2],
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_vec3(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: [f32; 3],
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_vec4(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: [f32; 4],
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_mat2(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: [[f32; 2]; 2],
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_mat3(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: [[f32; 3]; 3],
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }

    pub fn set_struct_mat4(
        &mut self,
        struct_name: &str,
        field_name: &str,
        value: [[f32; 4]; 4],
    ) -> &mut Self {
        self.set_struct(struct_name, field_name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ShaderStage;
    use crate::mock::{DriverCall, MockDriver};

    fn linked_program(driver: &mut MockDriver) -> u32 {
        let program = driver.create_program().unwrap();
        let stage = driver.create_stage(ShaderStage::Compute).unwrap();
        driver.attach_stage(program, stage);
        driver.link_program(program).unwrap();
        driver.delete_stage(stage);
        program
    }

    #[test]
    fn test_struct_field_name() {
        assert_eq!(struct_field_name("Light", "color"), "Light.color");
        assert_eq!(struct_field_name("lights[2]", "range"), "lights[2].range");
    }

    #[test]
    fn test_set_uniform_writes_resolved_location() {
        let mut driver = MockDriver::new();
        driver.register_uniform("u_time", 3);
        let program = linked_program(&mut driver);

        set_uniform(&mut driver, program, "u_time", 1.5f32);

        assert_eq!(
            driver.uniform_writes(),
            vec![(Some(3), UniformValue::Float(1.5))]
        );
    }

    #[test]
    fn test_struct_uniform_matches_direct_lookup() {
        let mut driver = MockDriver::new();
        driver.register_uniform("Light.color", 7);
        let program = linked_program(&mut driver);

        set_struct_uniform(&mut driver, program, "Light", "color", [1.0f32, 0.5, 0.25]);
        set_uniform(&mut driver, program, "Light.color", [1.0f32, 0.5, 0.25]);

        let writes = driver.uniform_writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], writes[1]);
        assert_eq!(writes[0].0, Some(7));
        assert!(driver.calls.contains(&DriverCall::UniformLocation {
            program,
            name: "Light.color".to_string(),
        }));
    }

    #[test]
    fn test_unknown_uniform_is_ignored() {
        let mut driver = MockDriver::new();
        let program = linked_program(&mut driver);

        set_uniform(&mut driver, program, "u_missing", 4i32);

        assert_eq!(driver.uniform_writes(), vec![(None, UniformValue::Int(4))]);
    }

    #[test]
    fn test_value_shapes() {
        assert_eq!(UniformValue::from(1i32), UniformValue::Int(1));
        assert_eq!(UniformValue::from(1u32), UniformValue::Uint(1));
        assert_eq!(UniformValue::from(2.0f64), UniformValue::Double(2.0));
        assert_eq!(UniformValue::from([0.0f32; 4]).glsl_type(), "vec4");
        assert_eq!(UniformValue::from([[0.0f32; 3]; 3]).glsl_type(), "mat3");
        assert_eq!(UniformValue::from([[0.0f32; 4]; 4]).glsl_type(), "mat4");
    }

    #[test]
    fn test_uniforms_view_chains() {
        let mut driver = MockDriver::new();
        driver.register_uniform("u_model", 0);
        driver.register_uniform("u_tint", 1);
        driver.register_uniform("Material.shininess", 2);
        let program = linked_program(&mut driver);

        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Uniforms::new(&mut driver, program)
            .set_mat4("u_model", identity)
            .set_vec4("u_tint", [1.0, 1.0, 1.0, 0.5])
            .set_struct("Material", "shininess", 32.0f32);

        assert_eq!(
            driver.uniform_writes(),
            vec![
                (Some(0), UniformValue::Mat4(identity)),
                (Some(1), UniformValue::Vec4([1.0, 1.0, 1.0, 0.5])),
                (Some(2), UniformValue::Float(32.0)),
            ]
        );
    }

    #[test]
    fn test_typed_struct_setters() {
        let mut driver = MockDriver::new();
        let fields = [
            "count", "mask", "range", "exposure", "uv", "color", "plane", "rot", "normal", "world",
        ];
        for (location, field) in fields.iter().enumerate() {
            driver.register_uniform(&struct_field_name("Light", field), location as i32);
        }
        let program = linked_program(&mut driver);

        let rot = [[0.0, -1.0], [1.0, 0.0]];
        let normal = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let world = [[2.0; 4]; 4];
        Uniforms::new(&mut driver, program)
            .set_struct_int("Light", "count", -3)
            .set_struct_uint("Light", "mask", 0xff)
            .set_struct_float("Light", "range", 12.5)
            .set_struct_double("Light", "exposure", 0.25)
            .set_struct_vec2("Light", "uv", [0.5, 0.75])
            .set_struct_vec3("Light", "color", [1.0, 0.5, 0.0])
            .set_struct_vec4("Light", "plane", [0.0, 1.0, 0.0, -2.0])
            .set_struct_mat2("Light", "rot", rot)
            .set_struct_mat3("Light", "normal", normal)
            .set_struct_mat4("Light", "world", world)
            .set_struct_float("Light", "missing", 1.0);

        assert_eq!(
            driver.uniform_writes(),
            vec![
                (Some(0), UniformValue::Int(-3)),
                (Some(1), UniformValue::Uint(0xff)),
                (Some(2), UniformValue::Float(12.5)),
                (Some(3), UniformValue::Double(0.25)),
                (Some(4), UniformValue::Vec2([0.5, 0.75])),
                (Some(5), UniformValue::Vec3([1.0, 0.5, 0.0])),
                (Some(6), UniformValue::Vec4([0.0, 1.0, 0.0, -2.0])),
                (Some(7), UniformValue::Mat2(rot)),
                (Some(8), UniformValue::Mat3(normal)),
                (Some(9), UniformValue::Mat4(world)),
                (None, UniformValue::Float(1.0)),
            ]
        );
    }
}
