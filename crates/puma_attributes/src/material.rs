//! Materials of generated mesh parts.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};

/// Raw material query results for one mesh part.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialBuffers {
    pub uv_set: i32,
    pub texture_keys: Vec<String>,
    pub texture_paths: Vec<String>,
    pub diffuse: Vec<i32>,
    pub ambient: Vec<i32>,
    pub specular: Vec<i32>,
    pub opacity: f64,
    pub shininess: f64,
}

impl Default for MaterialBuffers {
    fn default() -> Self {
        Self {
            uv_set: 0,
            texture_keys: Vec::new(),
            texture_paths: Vec::new(),
            diffuse: Vec::new(),
            ambient: Vec::new(),
            specular: Vec::new(),
            opacity: 1.0,
            shininess: 1.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Textures {
    pub diffuse: Option<String>,
    pub opacity: Option<String>,
    pub bump: Option<String>,
    /// Set when an opacity map is present, even if it is the diffuse map itself.
    pub alpha_transparency: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub uv_set: i32,
    pub diffuse: Option<Color>,
    pub ambient: Option<Color>,
    pub specular: Option<Color>,
    pub opacity: f64,
    pub shininess: f64,
    pub textures: Textures,
}

impl Material {
    pub fn transparency(&self) -> f64 {
        1.0 - self.opacity
    }
}

impl TryFrom<MaterialBuffers> for Material {
    type Error = Error;

    fn try_from(buffers: MaterialBuffers) -> Result<Self> {
        if buffers.texture_keys.len() != buffers.texture_paths.len() {
            return Err(Error::InvalidBuffer(format!(
                "{} texture keys for {} texture paths",
                buffers.texture_keys.len(),
                buffers.texture_paths.len()
            )));
        }

        let mut textures = Textures::default();
        for (key, path) in buffers.texture_keys.iter().zip(buffers.texture_paths) {
            match key.as_str() {
                "diffuseMap" | "colorMap" => textures.diffuse = Some(path),
                "opacityMap" => {
                    if textures.diffuse.as_deref() != Some(path.as_str()) {
                        textures.opacity = Some(path);
                    }
                    textures.alpha_transparency = true;
                }
                "bumpMap" => textures.bump = Some(path),
                _ => {}
            }
        }

        Ok(Self {
            uv_set: buffers.uv_set,
            diffuse: Color::from_components(&buffers.diffuse)?,
            ambient: Color::from_components(&buffers.ambient)?,
            specular: Color::from_components(&buffers.specular)?,
            opacity: buffers.opacity,
            shininess: buffers.shininess,
            textures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_are_classified_by_key() {
        let buffers = MaterialBuffers {
            texture_keys: vec!["colorMap".into(), "opacityMap".into(), "bumpMap".into(), "specularMap".into()],
            texture_paths: vec!["a.png".into(), "a.png".into(), "b.png".into(), "c.png".into()],
            diffuse: vec![255, 128, 0],
            opacity: 0.25,
            ..MaterialBuffers::default()
        };
        let material = Material::try_from(buffers).unwrap();
        assert_eq!(material.textures.diffuse.as_deref(), Some("a.png"));
        assert_eq!(material.textures.opacity, None);
        assert!(material.textures.alpha_transparency);
        assert_eq!(material.textures.bump.as_deref(), Some("b.png"));
        assert_eq!(material.diffuse, Some(Color::new(255, 128, 0)));
        assert_eq!(material.ambient, None);
        assert_eq!(material.transparency(), 0.75);
    }

    #[test]
    fn out_of_range_components_fail() {
        let buffers = MaterialBuffers {
            specular: vec![0, 300, 0],
            ..MaterialBuffers::default()
        };
        assert!(matches!(Material::try_from(buffers), Err(Error::Parse { .. })));
    }
}
