/// The `atlas_core` crate is the certification engine behind the Atlas
/// continuation driver: given a system of nonlinear equations, it proves,
/// with interval arithmetic, that a facet of the tracked solution manifold
/// carries a certified solution (or provably none), and that the boundary
/// mapping is a homeomorphism onto a half-ball.
///
/// Key components:
/// - **Interval**: outward-rounded interval/box/matrix arithmetic.
/// - **Proof**: partition selection, the certified solution search, and the
///   half-ball homeomorphism test.
/// - **Newton**: the parametric interval Newton contraction they rely on.
/// - **Lp**: the small dense simplex backing the orthant feasibility tests.
pub mod contractor;
pub mod interval;
pub mod linear;
pub mod lp;
pub mod newton;
pub mod proof;
pub mod system;
pub mod vars;
