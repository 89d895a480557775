use crate::foundation::{
    core::{DQuat, DVec3, Transform3},
    math::Lerp,
};

macro_rules! camera_pose_properties {
    (
        $(
            $(#[$meta:meta])*
            $field:ident / $setter:ident : $ty:ty = $default:expr;
        )*
    ) => {
        /// Camera transform and lens parameters produced by a frame of evaluation.
        ///
        /// Every setter flags its property as changed. Overrides and lerps can be restricted
        /// to changed properties, which is how context-level state takes precedence over
        /// blended values.
        #[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct CameraPose {
            $(
                $(#[$meta])*
                $field: $ty,
            )*
            changed: CameraPoseFlags,
        }

        /// One changed bit per [`CameraPose`] property.
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct CameraPoseFlags {
            $(pub $field: bool,)*
        }

        impl CameraPoseFlags {
            pub fn all(value: bool) -> Self {
                Self { $($field: value,)* }
            }

            pub fn any(&self) -> bool {
                false $(|| self.$field)*
            }
        }

        impl Default for CameraPose {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                    changed: CameraPoseFlags::default(),
                }
            }
        }

        impl CameraPose {
            $(
                pub fn $field(&self) -> $ty {
                    self.$field
                }

                pub fn $setter(&mut self, value: $ty) {
                    self.$field = value;
                    self.changed.$field = true;
                }
            )*

            /// Copy every property of `other`, flagging all of them as changed.
            pub fn override_all(&mut self, other: &CameraPose) {
                $(self.$setter(other.$field);)*
            }

            /// Copy only the properties `other` flagged as changed.
            pub fn override_changed(&mut self, other: &CameraPose) {
                $(
                    if other.changed.$field {
                        self.$setter(other.$field);
                    }
                )*
            }

            fn lerp_properties(&mut self, to: &CameraPose, factor: f64, changed_only: bool) {
                $(
                    if !changed_only || to.changed.$field {
                        let v = <$ty as Lerp>::lerp(&self.$field, &to.$field, factor);
                        self.$setter(v);
                    }
                )*
            }
        }
    };
}

camera_pose_properties! {
    location / set_location: DVec3 = DVec3::ZERO;
    rotation / set_rotation: DQuat = DQuat::IDENTITY;
    /// Distance to the subject the camera frames.
    target_distance / set_target_distance: f64 = 1000.0;
    /// Horizontal field of view in degrees, used when no focal length is set.
    field_of_view / set_field_of_view: f32 = 90.0;
    /// Focal length in millimeters; non-positive means "use the field of view".
    focal_length / set_focal_length: f32 = -1.0;
    aperture / set_aperture: f32 = 2.8;
    focus_distance / set_focus_distance: f32 = -1.0;
    sensor_width / set_sensor_width: f32 = 24.89;
    sensor_height / set_sensor_height: f32 = 18.67;
    squeeze_factor / set_squeeze_factor: f32 = 1.0;
    near_clip_plane / set_near_clip_plane: f32 = 10.0;
    /// Non-positive means infinite.
    far_clip_plane / set_far_clip_plane: f32 = -1.0;
    constrain_aspect_ratio / set_constrain_aspect_ratio: bool = false;
}

impl CameraPose {
    pub fn changed_flags(&self) -> CameraPoseFlags {
        self.changed
    }

    pub fn clear_all_changed_flags(&mut self) {
        self.changed = CameraPoseFlags::default();
    }

    pub fn set_all_changed_flags(&mut self) {
        self.changed = CameraPoseFlags::all(true);
    }

    /// Back to defaults, with no property flagged as changed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn transform(&self) -> Transform3 {
        Transform3::from_translation_rotation(self.location, self.rotation)
    }

    pub fn set_transform(&mut self, transform: Transform3) {
        self.set_location(transform.translation);
        self.set_rotation(transform.rotation);
    }

    /// Interpolate every property towards `to`.
    pub fn lerp_all(&mut self, to: &CameraPose, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        if factor >= 1.0 {
            self.override_all(to);
            return;
        }
        self.lerp_properties(to, factor, false);
    }

    /// Interpolate the properties `to` flagged as changed.
    pub fn lerp_changed(&mut self, to: &CameraPose, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        if factor >= 1.0 {
            self.override_changed(to);
            return;
        }
        self.lerp_properties(to, factor, true);
    }

    /// Horizontal field of view in degrees, derived from the focal length when one is set.
    pub fn effective_field_of_view(&self) -> f64 {
        if self.focal_length > 0.0 {
            let sensor = f64::from(self.sensor_width) * f64::from(self.squeeze_factor);
            let half = (sensor / (2.0 * f64::from(self.focal_length))).atan();
            (2.0 * half).to_degrees()
        } else {
            f64::from(self.field_of_view)
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.sensor_height <= 0.0 {
            return 1.0;
        }
        f64::from(self.sensor_width) * f64::from(self.squeeze_factor)
            / f64::from(self.sensor_height)
    }

    /// Direction the camera looks at, in world space.
    pub fn aim_direction(&self) -> DVec3 {
        self.rotation * crate::foundation::core::axis::FORWARD
    }

    pub fn target(&self) -> DVec3 {
        self.location + self.aim_direction() * self.target_distance
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/pose.rs"]
mod tests;
