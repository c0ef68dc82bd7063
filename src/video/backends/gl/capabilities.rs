use std::cmp::Ordering;
use std::ffi::CStr;

use gl;
use gl::types::*;

use crate::video::errors::*;

/// The API and version of a context. Desktop GL and GLES versions are not
/// comparable with each other.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    GL(u8, u8),
    ES(u8, u8),
}

impl Version {
    #[inline]
    fn split(self) -> (bool, (u8, u8)) {
        match self {
            Version::GL(major, minor) => (false, (major, minor)),
            Version::ES(major, minor) => (true, (major, minor)),
        }
    }

    /// Reads `GL_VERSION` of the current context.
    pub unsafe fn parse() -> Result<Version> {
        Version::from_desc(&parse_str(gl::VERSION)?)
    }

    /// Parses a `GL_VERSION` string, e.g. `3.3.0 NVIDIA 390.77` or `OpenGL ES 3.0 Mesa`.
    pub fn from_desc(desc: &str) -> Result<Version> {
        let unformatted = || Error::Backend(format!("[GL] Version '{}' is unformatted.", desc));

        let (es, tail) = if desc.starts_with("OpenGL ES-") {
            // `OpenGL ES-CM 1.1` and friends.
            (true, desc.get(13..).unwrap_or(""))
        } else if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else {
            (false, desc)
        };

        let mut numbers = tail
            .split(' ')
            .next()
            .unwrap_or("")
            .split('.')
            .map(|v| v.parse::<u8>().ok());

        match (numbers.next(), numbers.next()) {
            (Some(Some(major)), Some(Some(minor))) if es => Ok(Version::ES(major, minor)),
            (Some(Some(major)), Some(Some(minor))) => Ok(Version::GL(major, minor)),
            _ => Err(unformatted()),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, rhs: &Version) -> Option<Ordering> {
        let (lhs_es, lhs) = self.split();
        let (rhs_es, rhs) = rhs.split();

        if lhs_es == rhs_es {
            Some(lhs.cmp(&rhs))
        } else {
            None
        }
    }
}

macro_rules! extensions {
    ($($string:expr => $field:ident,)+) => {
        /// The shader related extensions of a context.
        #[derive(Debug, Clone, Copy, Default)]
        pub struct Extensions {
            $(pub $field: bool,)+
        }

        impl Extensions {
            unsafe fn parse(version: Version) -> Result<Extensions> {
                let mut extensions = Extensions::default();
                for name in extension_names(version)? {
                    match name.as_str() {
                        $($string => extensions.$field = true,)+
                        _ => {}
                    }
                }

                Ok(extensions)
            }
        }
    };
}

extensions! {
    "GL_ARB_shader_objects" => gl_arb_shader_objects,
    "GL_ARB_vertex_shader" => gl_arb_vertex_shader,
    "GL_ARB_fragment_shader" => gl_arb_fragment_shader,
    "GL_ARB_explicit_attrib_location" => gl_arb_explicit_attrib_location,
}

unsafe fn extension_names(version: Version) -> Result<Vec<String>> {
    // `glGetString(GL_EXTENSIONS)` is gone from core profiles.
    if version >= Version::GL(3, 0) || version >= Version::ES(3, 0) {
        let mut len = 0;
        gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut len);

        let mut names = Vec::with_capacity(len.max(0) as usize);
        for i in 0..len {
            let name = gl::GetStringi(gl::EXTENSIONS, i as GLuint);
            if !name.is_null() {
                names.push(CStr::from_ptr(name as *const _).to_string_lossy().into_owned());
            }
        }

        Ok(names)
    } else {
        Ok(parse_str(gl::EXTENSIONS)?
            .split_whitespace()
            .map(|v| v.to_owned())
            .collect())
    }
}

/// What the current context reports about itself.
#[derive(Debug)]
pub struct Capabilities {
    pub version: Version,
    pub vendor: String,
    pub renderer: String,
    /// e.g. `3.30 NVIDIA via Cg compiler`.
    pub shading_language: String,
    pub extensions: Extensions,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;

        Ok(Capabilities {
            version,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            shading_language: parse_str(gl::SHADING_LANGUAGE_VERSION)?,
            extensions: Extensions::parse(version)?,
        })
    }

    /// Checks that programmable vertex and fragment stages are available.
    pub fn check(&self) -> Result<()> {
        let ext = &self.extensions;
        let programmable = self.version >= Version::GL(2, 0)
            || self.version >= Version::ES(2, 0)
            || (ext.gl_arb_shader_objects && ext.gl_arb_vertex_shader && ext.gl_arb_fragment_shader);

        if !programmable {
            return Err(Error::Backend(format!(
                "[GL] {:?} does not support programmable shader stages.",
                self.version
            )));
        }

        if self.version < Version::GL(3, 3) && !ext.gl_arb_explicit_attrib_location {
            warn!(
                "[GL] {:?} lacks explicit attribute locations, shaders may fail to compile.",
                self.version
            );
        }

        Ok(())
    }
}

unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        return Err(Error::Backend(format!("[GL] String of {:#x} is null.", id)));
    }

    CStr::from_ptr(s as *const _)
        .to_str()
        .map(|v| v.to_owned())
        .map_err(|_| Error::Backend(format!("[GL] String of {:#x} is not utf-8.", id)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version() {
        assert_eq!(
            Version::from_desc("3.3.0 NVIDIA 390.77").unwrap(),
            Version::GL(3, 3)
        );

        assert_eq!(
            Version::from_desc("4.6 (Core Profile) Mesa 18.0.5").unwrap(),
            Version::GL(4, 6)
        );

        assert_eq!(
            Version::from_desc("OpenGL ES 3.0 Mesa 18.0.5").unwrap(),
            Version::ES(3, 0)
        );

        assert_eq!(
            Version::from_desc("OpenGL ES-CM 1.1").unwrap(),
            Version::ES(1, 1)
        );

        assert!(Version::from_desc("").is_err());
        assert!(Version::from_desc("OpenGL ES x.y").is_err());
        assert!(Version::from_desc("OpenGL ES-").is_err());
    }

    #[test]
    fn ordering() {
        assert!(Version::GL(3, 3) >= Version::GL(2, 0));
        assert!(Version::GL(2, 1) < Version::GL(3, 0));
        assert!(Version::ES(2, 0) < Version::ES(3, 0));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
    }
}
