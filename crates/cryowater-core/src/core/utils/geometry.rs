use nalgebra::{Point3, Rotation3, Vector3};

/// Builds the rotation for ZYZ Euler angles (phi, theta, psi) given in degrees.
///
/// The matrix is `Rz(phi) * Ry(theta) * Rz(psi)`, the convention used for specimen tilt
/// geometry: with `phi = psi = 0` it reduces to a tilt of `theta` about the Y axis.
pub fn euler_rotation(phi_degrees: f64, theta_degrees: f64, psi_degrees: f64) -> Rotation3<f64> {
    let rz_phi = Rotation3::from_axis_angle(&Vector3::z_axis(), phi_degrees.to_radians());
    let ry_theta = Rotation3::from_axis_angle(&Vector3::y_axis(), theta_degrees.to_radians());
    let rz_psi = Rotation3::from_axis_angle(&Vector3::z_axis(), psi_degrees.to_radians());
    rz_phi * ry_theta * rz_psi
}

pub fn rotate_point(rotation: &Rotation3<f64>, point: &Point3<f64>) -> Point3<f64> {
    rotation * point
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn zero_angles_give_identity() {
        let rot = euler_rotation(0.0, 0.0, 0.0);
        let p = Point3::new(1.0, -2.0, 3.0);
        assert!((rotate_point(&rot, &p) - p).norm() < EPS);
    }

    #[test]
    fn theta_alone_rotates_about_y() {
        let rot = euler_rotation(0.0, 90.0, 0.0);
        let x = rotate_point(&rot, &Point3::new(1.0, 0.0, 0.0));
        assert!((x - Point3::new(0.0, 0.0, -1.0)).norm() < EPS);

        let z = rotate_point(&rot, &Point3::new(0.0, 0.0, 1.0));
        assert!((z - Point3::new(1.0, 0.0, 0.0)).norm() < EPS);

        let y = rotate_point(&rot, &Point3::new(0.0, 1.0, 0.0));
        assert!((y - Point3::new(0.0, 1.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn phi_alone_rotates_about_z() {
        let rot = euler_rotation(90.0, 0.0, 0.0);
        let p = rotate_point(&rot, &Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn tilt_about_y_mixes_x_and_z() {
        let theta = 30.0f64;
        let rot = euler_rotation(0.0, theta, 0.0);
        let p = rotate_point(&rot, &Point3::new(10.0, 0.0, -4.0));
        let (s, c) = theta.to_radians().sin_cos();
        assert!((p.x - (c * 10.0 + s * -4.0)).abs() < EPS);
        assert!((p.z - (-s * 10.0 + c * -4.0)).abs() < EPS);
    }
}
