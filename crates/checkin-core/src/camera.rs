//! Camera choice for QR scanning.
//!
//! Devices only expose a free-form label, so back-facing cameras are ranked
//! by keywords: the main wide lens focuses best on a ticket held at arm's
//! length, while ultra-wide, telephoto and depth sensors do not.

/// A video input as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
}

impl CameraDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Other,
}

impl Platform {
    /// Detect iOS devices from a browser user agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        if ["iPad", "iPhone", "iPod"]
            .iter()
            .any(|device| user_agent.contains(device))
        {
            Self::Ios
        } else {
            Self::Other
        }
    }
}

const BACK_FACING: [&str; 6] = [
    "back",
    "rear",
    "environment",
    "facing back",
    "facing-back",
    "facingback",
];

const SCORES: [(&[&str], i32); 9] = [
    (&["main", "standard"], 10),
    (&["normal"], 8),
    (&["camera 0", "camera0"], 5),
    (&["back 0", "rear 0"], 5),
    (&["ultrawide", "ultra-wide", "ultra wide"], -10),
    (&["tele", "zoom", "telephoto"], -5),
    (&["depth", "tof", "time-of-flight"], -20),
    (&["camera 2", "camera2"], -3),
    (&["camera 1", "camera1"], 3),
];

fn is_back_facing(label: &str) -> bool {
    BACK_FACING.iter().any(|keyword| label.contains(keyword))
}

/// Keyword score of a camera label; higher is better for scanning.
pub fn score_label(label: &str) -> i32 {
    let label = label.to_lowercase();
    let mut score = SCORES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|keyword| label.contains(keyword)))
        .map(|(_, points)| points)
        .sum::<i32>();

    // Plain "wide" is the main lens on many phones
    if label.contains("wide") && !label.contains("ultra") {
        score += 2;
    }
    score
}

/// Pick the camera to scan with, or `None` when there is no camera.
pub fn select_camera(devices: &[CameraDevice], platform: Platform) -> Option<&CameraDevice> {
    let back_cameras = devices
        .iter()
        .filter(|device| is_back_facing(&device.label.to_lowercase()))
        .collect::<Vec<_>>();

    if !back_cameras.is_empty() {
        // Highest score; the earlier device wins ties
        return back_cameras
            .iter()
            .enumerate()
            .max_by_key(|(position, device)| {
                (score_label(&device.label), std::cmp::Reverse(*position))
            })
            .map(|(_, device)| *device);
    }

    match (devices.len(), platform) {
        (0, _) => None,
        (1, _) | (_, Platform::Ios) => devices.first(),
        (2, Platform::Other) => devices.last(),
        (count, Platform::Other) => devices.get(count / 2),
    }
}

/// Side of the square scan region inside a `width` x `height` viewfinder.
pub fn qr_box_size(width: u32, height: u32) -> u32 {
    let min_edge = f64::from(width.min(height));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (min_edge * 0.6).floor() as u32;
    scaled.max(150)
}
