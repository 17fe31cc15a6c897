use serde::{Deserialize, Serialize};

/// Orientation of the host window as reported by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceOrientation {
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Orientation applied to the preview surface and recording connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl VideoOrientation {
    /// Video orientation matching an interface orientation, if it is known
    pub fn from_interface(orientation: InterfaceOrientation) -> Option<Self> {
        match orientation {
            InterfaceOrientation::Unknown => None,
            InterfaceOrientation::Portrait => Some(Self::Portrait),
            InterfaceOrientation::PortraitUpsideDown => Some(Self::PortraitUpsideDown),
            InterfaceOrientation::LandscapeLeft => Some(Self::LandscapeLeft),
            InterfaceOrientation::LandscapeRight => Some(Self::LandscapeRight),
        }
    }

    /// Initial orientation for a freshly configured preview
    pub fn initial(orientation: InterfaceOrientation) -> Self {
        Self::from_interface(orientation).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_orientations_map_directly() {
        assert_eq!(
            VideoOrientation::from_interface(InterfaceOrientation::LandscapeLeft),
            Some(VideoOrientation::LandscapeLeft)
        );
        assert_eq!(
            VideoOrientation::from_interface(InterfaceOrientation::PortraitUpsideDown),
            Some(VideoOrientation::PortraitUpsideDown)
        );
    }

    #[test]
    fn test_unknown_falls_back_to_portrait() {
        assert_eq!(VideoOrientation::from_interface(InterfaceOrientation::Unknown), None);
        assert_eq!(
            VideoOrientation::initial(InterfaceOrientation::Unknown),
            VideoOrientation::Portrait
        );
        assert_eq!(
            VideoOrientation::initial(InterfaceOrientation::LandscapeRight),
            VideoOrientation::LandscapeRight
        );
    }
}
