fn main() {
    gslib_joints::cli::run();
}
