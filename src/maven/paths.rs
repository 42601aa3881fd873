use crate::maven::coordinates::MavenCoordinates;


/// Relative path of a project's POM inside a Maven repository, i.e. something like
///  "org/.../artifact/1.0/artifact-1.0.pom"
pub fn as_pom_path(coordinates: &MavenCoordinates) -> String {
    format!(
        "{}/{}/{}/{}",
        coordinates.group_id.0.replace('.', "/"),
        coordinates.artifact_id.0,
        coordinates.version.0,
        pom_file_name(coordinates),
    )
}

fn pom_file_name(coordinates: &MavenCoordinates) -> String {
    // NB: snapshot POMs are addressed by their unqualified version; repositories that only
    //  serve timestamped snapshot files will answer with 404 for those
    format!("{}-{}.pom", coordinates.artifact_id.0, coordinates.version.0)
}


#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::simple("com.acme:lib:2.0", "com/acme/lib/2.0/lib-2.0.pom")]
    #[case::single_segment_group("junit:junit:4.13.2", "junit/junit/4.13.2/junit-4.13.2.pom")]
    #[case::dashes("org.jenkins-ci.main:jenkins-core:2.401", "org/jenkins-ci/main/jenkins-core/2.401/jenkins-core-2.401.pom")]
    #[case::snapshot("a.b:c:1.0-SNAPSHOT", "a/b/c/1.0-SNAPSHOT/c-1.0-SNAPSHOT.pom")]
    fn test_as_pom_path(#[case] coordinates: &str, #[case] expected: &str) {
        let coordinates: MavenCoordinates = coordinates.parse().unwrap();
        assert_eq!(as_pom_path(&coordinates), expected);
    }
}
