fn main() {
    moda_lib::run()
}
