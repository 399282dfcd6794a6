/// Wraps whatever `$v` writes in parentheses when `$cond` holds.
macro_rules! possibly_parenthesized {
    ($builder:expr, $cond:expr, $v:expr) => {
        if $cond {
            $builder.push('(');
            $v;
            $builder.push(')');
        } else {
            $v;
        }
    };
}
pub(crate) use possibly_parenthesized;
