fn main() -> color_eyre::eyre::Result<()> {
    op_client::cli::main()
}
