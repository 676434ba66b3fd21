//! Key management commands.
//!
//! `sigil keys generate` - Generate an identity key pair and a renewal secret.

use sigil_token::{GeneratedKeyPair, RenewalSecret};
use std::fs;
use std::path::PathBuf;

/// Generate an Ed25519 identity key pair and a base64 renewal secret.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = GeneratedKeyPair::ed25519()?;
    let secret = RenewalSecret::generate();

    if let Some(output_dir) = output {
        fs::create_dir_all(&output_dir)?;

        let private_path = output_dir.join("identity.pem");
        let public_path = output_dir.join("identity.pub.pem");
        let secret_path = output_dir.join("renewal.secret");

        keypair.save_to_files(&private_path, &public_path)?;
        fs::write(&secret_path, &secret)?;

        println!("✔ Generated identity key pair and renewal secret:");
        println!("  Private key:    {}", private_path.display());
        println!("  Public key:     {}", public_path.display());
        println!("  Renewal secret: {}", secret_path.display());
        println!();
        println!("⚠️  Keep the private key and renewal secret out of version control.");
        println!();
        println!("Reference them from sigil.yaml:");
        println!("  identity:");
        println!("    algorithm: EdDSA");
        println!("    private_key_file: {}", private_path.display());
        println!("    public_key_file: {}", public_path.display());
        println!("  renewal:");
        println!("    secret_file: {}", secret_path.display());
        println!("    encoding: base64");
    } else {
        println!("Private key (keep secure!):");
        print!("{}", keypair.private_key_pem());
        println!();
        println!("Public key:");
        print!("{}", keypair.public_key_pem());
        println!();
        println!("Renewal secret (base64, keep secure!):");
        println!("{}", secret);
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}
