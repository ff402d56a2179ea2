/// Fixed lighting program shared by both demos (GLSL ES 1.00)

pub const VERTEX_SHADER: &str = r#"
attribute vec4 position;
attribute vec4 color;
attribute vec4 normal;
uniform mat4 mvp;
uniform mat4 model;
uniform mat4 inverseTranspose;
varying vec4 v_color;
varying vec3 v_normal;
varying vec3 v_position;
void main() {
  gl_Position = mvp * position;
  v_position = vec3(model * position);
  v_normal = normalize(vec3(inverseTranspose * vec4(normal.xyz, 0.0)));
  v_color = color;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"
precision mediump float;
uniform vec3 lightColor;
uniform vec3 lightPosition;
uniform vec3 ambientLight;
varying vec3 v_normal;
varying vec3 v_position;
varying vec4 v_color;
void main() {
  vec3 lightDirection = normalize(lightPosition - v_position);
  float nDotL = max(dot(lightDirection, normalize(v_normal)), 0.0);
  vec3 diffuse = lightColor * v_color.rgb * nDotL;
  vec3 ambient = ambientLight * v_color.rgb;
  gl_FragColor = vec4(diffuse + ambient, 1.0);
}
"#;

/// Attribute and uniform names the backend binds
pub mod names {
    pub const POSITION: &str = "position";
    pub const NORMAL: &str = "normal";
    pub const COLOR: &str = "color";
    pub const MVP: &str = "mvp";
    pub const MODEL: &str = "model";
    pub const INVERSE_TRANSPOSE: &str = "inverseTranspose";
    pub const LIGHT_COLOR: &str = "lightColor";
    pub const LIGHT_POSITION: &str = "lightPosition";
    pub const AMBIENT_LIGHT: &str = "ambientLight";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shaders_declare_bound_names() {
        let vertex_names = [
            names::POSITION,
            names::NORMAL,
            names::COLOR,
            names::MVP,
            names::MODEL,
            names::INVERSE_TRANSPOSE,
        ];
        for name in vertex_names {
            assert!(VERTEX_SHADER.contains(name), "vertex shader lacks {name}");
        }
        for name in [names::LIGHT_COLOR, names::LIGHT_POSITION, names::AMBIENT_LIGHT] {
            assert!(FRAGMENT_SHADER.contains(name), "fragment shader lacks {name}");
        }
    }
}
