//! In-flight drag and resize gestures.
//!
//! A gesture only tracks a preview geometry; nothing is written to the
//! dashboard until the engine ends it, at which point the fields the pointer
//! touched are laid over the instance's current layout, snapped, and committed
//! as a single history entry.

use std::fmt;
use std::str::FromStr;

use blackbox_core::models::{Geometry, GeometryPatch, InstanceId};
use blackbox_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Drag: only `x`/`y` of a preview update are honoured.
    Move,
    /// Resize: any field may change (top/left handles move the origin).
    Resize,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Move => "move",
            Self::Resize => "resize",
        })
    }
}

impl FromStr for GestureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move" | "drag" => Ok(Self::Move),
            "resize" => Ok(Self::Resize),
            other => Err(Error::InvalidArgument(format!("unknown gesture: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    instance_id: InstanceId,
    kind: GestureKind,
    origin: Geometry,
    preview: Geometry,
    touched: GeometryPatch,
}

impl Gesture {
    #[must_use]
    pub const fn new(instance_id: InstanceId, kind: GestureKind, origin: Geometry) -> Self {
        Self {
            instance_id,
            kind,
            origin,
            preview: origin,
            touched: GeometryPatch {
                x: None,
                y: None,
                w: None,
                h: None,
            },
        }
    }

    #[must_use]
    pub const fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    #[must_use]
    pub const fn kind(&self) -> GestureKind {
        self.kind
    }

    #[must_use]
    pub const fn origin(&self) -> Geometry {
        self.origin
    }

    #[must_use]
    pub const fn preview(&self) -> Geometry {
        self.preview
    }

    /// Fold a pointer update into the preview and return it (unsnapped).
    pub fn update(&mut self, patch: &GeometryPatch) -> Result<Geometry> {
        patch.validate()?;
        let effective = match self.kind {
            GestureKind::Move => GeometryPatch {
                x: patch.x,
                y: patch.y,
                w: None,
                h: None,
            },
            GestureKind::Resize => *patch,
        };
        self.preview = self.preview.merged(&effective);
        self.touched = GeometryPatch {
            x: effective.x.or(self.touched.x),
            y: effective.y.or(self.touched.y),
            w: effective.w.or(self.touched.w),
            h: effective.h.or(self.touched.h),
        };
        Ok(self.preview)
    }

    /// The preview rebased onto `current`: only fields the pointer touched
    /// replace what is stored now.
    #[must_use]
    pub fn applied_to(&self, current: Geometry) -> Geometry {
        current.merged(&self.touched)
    }
}
