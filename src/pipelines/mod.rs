/**
 * Render pipeline definitions: the settled model pass, the dissolve-reveal
 * pass and the alpha-blended placeholder pass.
 */
pub mod basic;
pub mod dissolve;
pub mod transparent;
